//! Final action on a filled form.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::locator::{first, ElementHandle, Page, Query};
use crate::result::FormResult;

/// What to do with a filled form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmitAction {
    /// Submit for approval
    Submit,
    /// Open the response preview
    Preview,
    /// Keep as a draft
    SaveDraft,
}

impl SubmitAction {
    /// All actions, in menu order
    pub const ALL: [Self; 3] = [Self::Submit, Self::Preview, Self::SaveDraft];

    /// Menu caption
    #[must_use]
    pub const fn caption(self) -> &'static str {
        match self {
            Self::Submit => "Submit for approval",
            Self::Preview => "Preview Response",
            Self::SaveDraft => "Save as Draft",
        }
    }
}

impl fmt::Display for SubmitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Submit => "submit",
            Self::Preview => "preview",
            Self::SaveDraft => "save-draft",
        })
    }
}

/// Submit button
#[must_use]
pub fn submit_button() -> Query {
    Query::anywhere("button").attr_equals("id", "submit-form-button")
}

/// Toggle of the menu holding the secondary actions
#[must_use]
pub fn menu_toggle() -> Query {
    Query::anywhere("button").attr_contains("class", "dropdown-toggle")
}

/// Entry of the secondary actions menu
#[must_use]
pub fn menu_item(caption: &str) -> Query {
    Query::anywhere("a").text_equals(caption)
}

/// Perform `action` on the page; returns the action taken.
///
/// No waiting and no retry: the form is already settled once filled.
pub fn dispatch<P: Page>(page: &P, action: SubmitAction) -> FormResult<SubmitAction> {
    info!(target: "formfill::submit", %action, "Dispatching");
    match action {
        SubmitAction::Submit => click_first(page, &submit_button())?,
        SubmitAction::Preview | SubmitAction::SaveDraft => {
            click_first(page, &menu_toggle())?;
            click_first(page, &menu_item(action.caption()))?;
        }
    }
    Ok(action)
}

fn click_first<P: Page>(page: &P, query: &Query) -> FormResult<()> {
    first(page.find_all(query)?, query)?.click()
}
