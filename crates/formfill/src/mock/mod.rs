//! Browser-free page for tests and dry runs.
//!
//! [`MockPage`] is a scriptable in-memory DOM; [`event_form`] builds a replica
//! of the registration form on top of it.

mod form;
mod page;

pub use form::{event_form, event_form_with, EventForm, FormQuirks};
pub use page::{ClickEffect, Interaction, MockElement, MockNode, MockPage, NodeId};
