//! Formfill: resilient filling of one animation-heavy registration form
//!
//! The form renders late, closes its dropdowns with an animation, and needs
//! some widgets activated twice. Formfill survives that with three small
//! primitives and a fixed schema on top of them.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       FORMFILL Architecture                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌──────────────┐   ┌────────────────────────┐ │
//! │  │ Event Form  │   │ FormFiller   │   │ FieldFiller            │ │
//! │  │ Record      │──►│ (SCHEMA)     │──►│ text/rich/select/click │ │
//! │  └─────────────┘   └──────────────┘   └───────────┬────────────┘ │
//! │                                                   │              │
//! │            ┌───────────────┬───────────────┐      │              │
//! │            │ Waiter        │ retry_obscured│◄─────┘              │
//! │            └───────┬───────┴───────┬───────┘                     │
//! │                    ▼               ▼                             │
//! │            ┌───────────────────────────────┐                     │
//! │            │ Page / ElementHandle (Query)  │  CDP or MockPage    │
//! │            └───────────────────────────────┘                     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use formfill::mock::event_form;
//! use formfill::{dispatch, EventFormRecord, FillConfig, FormFiller, Overrides, SubmitAction};
//!
//! # let yaml = include_str!("../tests/fixtures/event.yml");
//! let record = EventFormRecord::from_yaml_str(yaml, &Overrides::new())?;
//! let form = event_form(&record);
//! let report = FormFiller::new(FillConfig::fast()).fill(&form.page, &record)?;
//! assert!(form.unmet().is_empty());
//! dispatch(&form.page, SubmitAction::SaveDraft)?;
//! # assert_eq!(report.agreed(), Some(2));
//! # Ok::<(), formfill::FormError>(())
//! ```

#![warn(missing_docs)]

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc)]
pub mod cdp;
mod config;
#[allow(clippy::missing_errors_doc)]
pub mod fill;
mod form;
mod locator;
pub mod mock;
mod record;
mod result;
mod retry;
mod submit;
mod wait;

#[cfg(feature = "browser")]
pub use cdp::{CdpElement, CdpPage, CdpSession, LaunchOptions};
pub use config::{FillConfig, LabeledClickPolicy, DEFAULT_LABELED_POLL_MS};
pub use fill::{form_has_loaded, wait_for_form, FieldFiller, TextMatch, LOADED_GRID_ITEMS};
pub use form::{FillReport, FillStep, FormFiller, Label, StepRecord, SCHEMA};
pub use locator::{
    exactly, first, xpath_literal, Axis, ElementHandle, Page, Predicate, Query, ScriptArg,
    SearchContext, Step,
};
pub use record::{EventFormRecord, Field, ListField, Overrides};
pub use result::{FormError, FormResult};
pub use retry::{retry_obscured, RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS};
pub use submit::{dispatch, SubmitAction};
pub use wait::{WaitOptions, Waiter, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
