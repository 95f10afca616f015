//! In-memory replica of the event registration form.
//!
//! Built from [`SCHEMA`] and a record so every step finds the widget it
//! expects, with only the record's values (plus a decoy) offered as options.

use std::path::Path;
use std::time::Duration;

use super::page::{ClickEffect, MockNode, MockPage, NodeId};
use crate::fill::{TextMatch, LOADED_GRID_ITEMS};
use crate::form::{FillStep, SCHEMA};
use crate::record::{EventFormRecord, Field};

/// Option offered next to the record's value
const DECOY: &str = "(none of these)";

/// Timing quirks applied to the replica's widgets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormQuirks {
    /// Clicks intercepted on every dropdown option before one lands
    pub obscured_options: u32,
    /// Delay before text fields and dropdowns become interactable and
    /// question inputs appear
    pub reveal_after: Duration,
}

impl FormQuirks {
    /// Intercept the first `clicks` clicks on each dropdown option
    #[must_use]
    pub const fn with_obscured_options(mut self, clicks: u32) -> Self {
        self.obscured_options = clicks;
        self
    }

    /// Render widgets late
    #[must_use]
    pub const fn with_reveal_after(mut self, delay: Duration) -> Self {
        self.reveal_after = delay;
        self
    }
}

#[derive(Debug, Clone)]
enum Expect {
    Value(String),
    Clicked,
}

#[derive(Debug, Clone)]
struct Target {
    name: String,
    field: Option<Field>,
    node: NodeId,
    expect: Expect,
}

/// A replica page plus the nodes a complete fill must touch
#[derive(Debug)]
pub struct EventForm {
    /// The page to fill
    pub page: MockPage,
    /// Tag option rows, in record order
    pub tag_rows: Vec<NodeId>,
    /// Terms checkboxes
    pub agree_boxes: Vec<NodeId>,
    /// Submit-for-approval button
    pub submit: NodeId,
    /// Toggle of the secondary actions menu
    pub menu_toggle: NodeId,
    /// "Save as Draft" menu entry
    pub save_draft: NodeId,
    /// "Preview Response" menu entry
    pub preview: NodeId,
    targets: Vec<Target>,
}

impl EventForm {
    /// Current value of the input backing `field`
    #[must_use]
    pub fn value_of(&self, field: Field) -> Option<String> {
        self.target(field).map(|t| self.page.value(t.node))
    }

    /// Whether the option or input chosen for `field` was clicked
    #[must_use]
    pub fn was_clicked(&self, field: Field) -> bool {
        self.target(field)
            .is_some_and(|t| self.page.clicks(t.node) > 0)
    }

    /// Descriptions of every target a fill has not satisfied yet
    #[must_use]
    pub fn unmet(&self) -> Vec<String> {
        let mut unmet: Vec<String> = self
            .targets
            .iter()
            .filter(|t| match &t.expect {
                Expect::Value(expected) => self.page.value(t.node) != *expected,
                Expect::Clicked => self.page.clicks(t.node) == 0,
            })
            .map(|t| t.name.clone())
            .collect();
        unmet.extend(
            self.agree_boxes
                .iter()
                .filter(|&&id| self.page.clicks(id) == 0)
                .map(|id| format!("agree box #{id}")),
        );
        unmet
    }

    fn target(&self, field: Field) -> Option<&Target> {
        self.targets.iter().find(|t| t.field == Some(field))
    }
}

/// Replica with no timing quirks
#[must_use]
pub fn event_form(record: &EventFormRecord) -> EventForm {
    event_form_with(record, FormQuirks::default())
}

/// Replica with the given quirks
#[must_use]
pub fn event_form_with(record: &EventFormRecord, quirks: FormQuirks) -> EventForm {
    let page = MockPage::new();
    let form = page.append(page.root(), MockNode::new("form"));
    let mut builder = Builder {
        page: &page,
        form,
        quirks,
        targets: Vec::new(),
        tag_rows: Vec::new(),
        agree_boxes: Vec::new(),
    };
    for step in SCHEMA {
        builder.step(step, record);
    }
    for _ in 0..LOADED_GRID_ITEMS {
        let _ = page.append(form, MockNode::new("field-group-grid-item"));
    }
    let Builder {
        targets,
        tag_rows,
        agree_boxes,
        ..
    } = builder;

    let submit = page.append(
        form,
        MockNode::new("button")
            .attr("id", "submit-form-button")
            .text("Submit for approval"),
    );
    let menu_toggle = page.append(
        form,
        MockNode::new("button").attr("class", "btn dropdown-toggle"),
    );
    let menu = page.append(form, MockNode::new("ul").detached());
    page.on_click(menu_toggle, ClickEffect::Attach(menu));
    let save_draft = page.append(menu, MockNode::new("a").text("Save as Draft"));
    let preview = page.append(menu, MockNode::new("a").text("Preview Response"));
    page.restart_clock();
    page.clear_log();

    EventForm {
        page,
        tag_rows,
        agree_boxes,
        submit,
        menu_toggle,
        save_draft,
        preview,
        targets,
    }
}

struct Builder<'a> {
    page: &'a MockPage,
    form: NodeId,
    quirks: FormQuirks,
    targets: Vec<Target>,
    tag_rows: Vec<NodeId>,
    agree_boxes: Vec<NodeId>,
}

impl Builder<'_> {
    fn step(&mut self, step: &FillStep, record: &EventFormRecord) {
        match *step {
            FillStep::Text { label, field } => {
                let group = self.group(true);
                let text = match label.matching {
                    TextMatch::Contains => label.text.to_string(),
                    TextMatch::Exact => format!("  {}  ", label.text),
                };
                let _ = self.page.append(group, MockNode::new("label").text(text));
                let input = self.page.append(group, MockNode::new("input").attr("type", "text"));
                self.expect_value(field, input, record.text(field));
            }
            FillStep::RichText { label, field } => {
                let group = self.group(false);
                let _ = self.page.append(group, MockNode::new("label").text(label));
                let _ = self.page.append(
                    group,
                    MockNode::new("button").attr("title", "Toggle html mode"),
                );
                let area = self
                    .page
                    .append(group, MockNode::new("textarea").attr("ng-model", "html"));
                self.expect_value(field, area, record.text(field));
            }
            FillStep::Select { label, field } => {
                let value = record.text(field);
                let rows = self.dropdown(label, &[value]);
                self.expect_click(field, rows[0]);
            }
            FillStep::SelectEach { label, field } => {
                let values: Vec<&str> = record.list(field).iter().map(String::as_str).collect();
                self.tag_rows = self.dropdown(label, &values);
            }
            FillStep::LabeledClick { label, field } => {
                let value = record.text(field);
                let group = self.group(false);
                let _ = self.page.append(group, MockNode::new("label").text(label));
                let choices = self.page.append(group, MockNode::new("div"));
                let late = MockNode::new("input")
                    .attr("type", "radio")
                    .appear_after(self.quirks.reveal_after);
                let chosen = self
                    .page
                    .append(choices, late.clone().attr("aria-label", value));
                let _ = self.page.append(choices, late.attr("aria-label", DECOY));
                self.expect_click(field, chosen);
            }
            FillStep::Times { start, end } => {
                let group = self.group(false);
                for field in [start, end] {
                    let picker = self.page.append(
                        group,
                        MockNode::new("input").attr("class", "form-control dpicker"),
                    );
                    self.expect_value(field, picker, record.text(field));
                }
            }
            FillStep::File { extension, field } => {
                let input = self.page.append(
                    self.form,
                    MockNode::new("input")
                        .attr("type", "file")
                        .attr("ngf-pattern", format!("'{extension},.png'")),
                );
                let path = Path::new(record.text(field));
                let absolute = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    std::env::current_dir()
                        .map(|dir| dir.join(path))
                        .unwrap_or_else(|_| path.to_path_buf())
                };
                self.expect_value(field, input, &absolute.display().to_string());
            }
            FillStep::AgreeAll => {
                for text in ["I agree", "I agee"] {
                    let wrap = self.page.append(self.form, MockNode::new("div"));
                    let _ = self.page.append(wrap, MockNode::new("label").text(text));
                    let input = self
                        .page
                        .append(wrap, MockNode::new("input").attr("type", "checkbox"));
                    self.agree_boxes.push(input);
                }
            }
        }
    }

    fn group(&self, late: bool) -> NodeId {
        let mut node = MockNode::new("div").attr("class", "form-group");
        if late {
            node = node.reveal_after(self.quirks.reveal_after);
        }
        self.page.append(self.form, node)
    }

    /// chosen widget; the result list is attached by the toggle and detached
    /// again by picking a row
    fn dropdown(&self, label: &str, values: &[&str]) -> Vec<NodeId> {
        let group = self.group(false);
        let head = self.page.append(group, MockNode::new("div"));
        let _ = self.page.append(head, MockNode::new("label").text(label));
        let toggle = self.page.append(
            group,
            MockNode::new("div")
                .attr("class", "chosen-container chosen-container-single")
                .reveal_after(self.quirks.reveal_after),
        );
        let results = self.page.append(
            toggle,
            MockNode::new("ul")
                .attr("class", "chosen-results")
                .detached(),
        );
        self.page.on_click(toggle, ClickEffect::Attach(results));
        let row = |text: &str| {
            let id = self.page.append(
                results,
                MockNode::new("li")
                    .attr("class", "active-result")
                    .text(text)
                    .obscured_for(self.quirks.obscured_options),
            );
            self.page.on_click(id, ClickEffect::Detach(results));
            id
        };
        let rows = values.iter().map(|v| row(v)).collect();
        let _ = row(DECOY);
        rows
    }

    fn expect_value(&mut self, field: Field, node: NodeId, value: &str) {
        self.targets.push(Target {
            name: field.to_string(),
            field: Some(field),
            node,
            expect: Expect::Value(value.to_string()),
        });
    }

    fn expect_click(&mut self, field: Field, node: NodeId) {
        self.targets.push(Target {
            name: field.to_string(),
            field: Some(field),
            node,
            expect: Expect::Clicked,
        });
    }
}
