//! Fill strategies for the form's field widgets.
//!
//! Each strategy resolves its targets fresh, waits where the widget renders
//! late, and (for the two click-heavy widgets) retries intercepted clicks.

use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::config::{FillConfig, LabeledClickPolicy};
use crate::locator::{exactly, first, ElementHandle, Page, Predicate, Query, ScriptArg};
use crate::result::{FormError, FormResult};
use crate::retry::{retry_obscured, RetryPolicy};
use crate::wait::Waiter;

/// Script that sets both date/time pickers through their Angular model
pub const FILL_TIMES_JS: &str = include_str!("scripts/fill_times.js");

/// How a label's text is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMatch {
    /// Label text contains the needle
    #[default]
    Contains,
    /// Label text equals the needle after whitespace normalization
    Exact,
}

/// Queries for the form's widgets
pub mod queries {
    use super::{Predicate, Query, TextMatch};

    /// The element wrapping a label and its input
    #[must_use]
    pub fn label_container(label: &str, matching: TextMatch) -> Query {
        let base = Query::anywhere("*");
        match matching {
            TextMatch::Contains => base.text_contains(label),
            TextMatch::Exact => base.text_normalized(label),
        }
        .parent()
    }

    /// Custom (chosen) dropdown next to `label`
    #[must_use]
    pub fn dropdown_toggle(label: &str) -> Query {
        Query::anywhere("*")
            .text_contains(label)
            .parent()
            .parent()
            .descendant("*")
            .attr_contains("class", "chosen-container")
    }

    /// Visible result row of an open dropdown
    #[must_use]
    pub fn dropdown_option(option: &str) -> Query {
        Query::anywhere("li")
            .attr_contains("class", "active-result")
            .text_contains(option)
    }

    /// "Toggle html" button of the rich editor next to `label`
    #[must_use]
    pub fn html_toggle(label: &str) -> Query {
        Query::anywhere("*")
            .text_contains(label)
            .parent()
            .descendant("button")
            .attr_contains("title", "Toggle html")
    }

    /// Raw-markup text area of the rich editor next to `label`
    #[must_use]
    pub fn html_textarea(label: &str) -> Query {
        Query::anywhere("*")
            .text_contains(label)
            .parent()
            .descendant("textarea")
            .attr_equals("ng-model", "html")
    }

    /// Input labelled `option` under the question `label`
    #[must_use]
    pub fn labeled_input(label: &str, option: &str) -> Query {
        Query::anywhere("label")
            .text_contains(label)
            .parent()
            .descendant("input")
            .attr_equals("aria-label", option)
    }

    /// File input accepting `extension`
    #[must_use]
    pub fn file_input(extension: &str) -> Query {
        Query::anywhere("input")
            .attr_equals("type", "file")
            .attr_contains("ngf-pattern", extension)
    }

    /// The start and end date/time pickers
    #[must_use]
    pub fn time_pickers() -> Query {
        Query::anywhere("input").attr_contains("class", "dpicker")
    }

    /// Every "I agree" checkbox, including the misspelled one
    #[must_use]
    pub fn agree_inputs() -> Query {
        Query::anywhere("label")
            .any_of(vec![
                Predicate::text_equals("I agree"),
                Predicate::text_equals("I agee"),
            ])
            .parent()
            .child("input")
    }

    /// Repeated grid items; the form is loaded once 18 are present
    #[must_use]
    pub fn grid_items() -> Query {
        Query::anywhere("field-group-grid-item")
    }
}

/// Number of grid items a fully rendered form shows
pub const LOADED_GRID_ITEMS: usize = 18;

/// The fill strategies, bound to one page and one timing configuration
#[derive(Debug)]
pub struct FieldFiller<'p, P: Page> {
    page: &'p P,
    waiter: Waiter,
    retry: RetryPolicy,
    labeled: LabeledClickPolicy,
}

impl<'p, P: Page> FieldFiller<'p, P> {
    /// Bind strategies to `page`
    #[must_use]
    pub const fn new(page: &'p P, config: &FillConfig) -> Self {
        Self {
            page,
            waiter: Waiter::new(config.wait),
            retry: config.retry,
            labeled: config.labeled,
        }
    }

    /// Clear the input under `label` and type `value`
    pub fn text(&self, label: &str, matching: TextMatch, value: &str) -> FormResult<()> {
        info!(target: "formfill::fill", label, value, "Filling text");
        let container = self
            .waiter
            .until_interactable(self.page, &queries::label_container(label, matching))?;
        let input_query = Query::within("input");
        let input = first(container.find_within(&input_query)?, &input_query)?;
        input.clear()?;
        input.send_keys(value)
    }

    /// Switch the rich editor under `label` to HTML mode and type `html` verbatim
    pub fn rich_text(&self, label: &str, html: &str) -> FormResult<()> {
        info!(target: "formfill::fill", label, "Filling rich text");
        let toggle_query = queries::html_toggle(label);
        let toggle = exactly(self.page.find_all(&toggle_query)?, 1, &toggle_query)?;
        toggle[0].click()?;

        let area_query = queries::html_textarea(label);
        let area = first(self.page.find_all(&area_query)?, &area_query)?;
        area.clear()?;
        area.click()?;
        area.send_keys(html)
    }

    /// Open the dropdown under `label` and pick the row containing `option`.
    ///
    /// The toggle is clicked twice. The chosen widget often drops the first
    /// click while a previously used dropdown is still closing; a second click
    /// on an open dropdown leaves it open, so two clicks are always safe.
    pub fn select(&self, label: &str, option: &str) -> FormResult<()> {
        retry_obscured(&self.retry, "select", || {
            info!(target: "formfill::fill", label, option, "Selecting");
            let toggle = self
                .waiter
                .until_interactable(self.page, &queries::dropdown_toggle(label))?;
            toggle.click()?;
            toggle.click()?;
            let row = self
                .waiter
                .until_interactable(self.page, &queries::dropdown_option(option))?;
            row.click()
        })
    }

    /// Click the input labelled `option` under the question `label`.
    ///
    /// Polls until the input exists. Unbounded unless the labeled-click policy
    /// sets a timeout.
    pub fn click_labeled(&self, label: &str, option: &str) -> FormResult<()> {
        retry_obscured(&self.retry, "click_labeled", || {
            info!(target: "formfill::fill", label, option, "Clicking");
            let query = queries::labeled_input(label, option);
            let start = Instant::now();
            loop {
                if let Some(input) = self.page.find_all(&query)?.into_iter().next() {
                    return input.click();
                }
                if let Some(limit) = self.labeled.timeout() {
                    if start.elapsed() >= limit {
                        return Err(FormError::NotReady {
                            query: query.to_xpath(),
                            elapsed_ms: start.elapsed().as_millis() as u64,
                        });
                    }
                }
                info!(target: "formfill::fill", label, option, "Waiting for element...");
                std::thread::sleep(self.labeled.interval());
            }
        })
    }

    /// Point the file input accepting `extension` at `path`
    pub fn file(&self, extension: &str, path: &Path) -> FormResult<()> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        info!(target: "formfill::fill", path = %absolute.display(), "Attaching file");
        let query = queries::file_input(extension);
        let input = first(self.page.find_all(&query)?, &query)?;
        input.upload_file(&absolute)
    }

    /// Set the start and end pickers in one script call
    pub fn times(&self, start: &str, end: &str) -> FormResult<()> {
        info!(target: "formfill::fill", start, end, "Entering times");
        let query = queries::time_pickers();
        let pickers = exactly(self.page.find_all(&query)?, 2, &query)?;
        self.page.call_function(
            FILL_TIMES_JS,
            &[
                ScriptArg::Element(&pickers[0]),
                ScriptArg::Element(&pickers[1]),
                ScriptArg::Str(start),
                ScriptArg::Str(end),
            ],
        )
    }

    /// Tick every "I agree" box; returns how many were clicked
    pub fn agree_all(&self) -> FormResult<usize> {
        let boxes = self.page.find_all(&queries::agree_inputs())?;
        info!(target: "formfill::fill", count = boxes.len(), "Agreeing to terms");
        for agree in &boxes {
            agree.click()?;
        }
        Ok(boxes.len())
    }
}

/// Whether the form has rendered all of its grid items
pub fn form_has_loaded<P: Page>(page: &P) -> FormResult<bool> {
    Ok(page.find_all(&queries::grid_items())?.len() == LOADED_GRID_ITEMS)
}

/// Block until [`form_has_loaded`] holds or `waiter` times out
pub fn wait_for_form<P: Page>(page: &P, waiter: &Waiter) -> FormResult<()> {
    let _ = waiter.wait_for(&queries::grid_items().to_xpath(), || form_has_loaded(page))?;
    Ok(())
}
