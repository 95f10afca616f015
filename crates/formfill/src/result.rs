//! Result and error types for formfill.

use thiserror::Error;

/// Result type for formfill operations
pub type FormResult<T> = Result<T, FormError>;

/// Errors that can occur while locating, waiting on, or filling form elements
#[derive(Debug, Error)]
pub enum FormError {
    /// A query matched nothing where something was required
    #[error("Field not found: {query}")]
    FieldNotFound {
        /// Rendered query that came back empty
        query: String,
    },

    /// A query matched an unexpected number of controls
    #[error("Ambiguous control: expected {expected} match(es) for {query}, found {found}")]
    AmbiguousControl {
        /// Rendered query
        query: String,
        /// Number of matches required
        expected: usize,
        /// Number of matches present
        found: usize,
    },

    /// Wait for an interactable element timed out
    #[error("Element not ready after {elapsed_ms}ms: {query}")]
    NotReady {
        /// Rendered query that was waited on
        query: String,
        /// Time spent waiting
        elapsed_ms: u64,
    },

    /// A click landed on a different element (usually a closing overlay)
    #[error("Click on {element} intercepted by {obscured_by} (after {attempts} attempt(s))")]
    ElementObscured {
        /// Description of the element that was clicked
        element: String,
        /// Description of the element that received the click
        obscured_by: String,
        /// Attempts made before giving up
        attempts: u32,
    },

    /// A handle no longer resolves to a node in the page
    #[error("Stale element: {element}")]
    StaleElement {
        /// Description of the handle
        element: String,
    },

    /// A schema step failed; wraps the underlying cause
    #[error("Step {index} ({step}) failed: {source}")]
    StepFailed {
        /// Position of the step in the schema
        index: usize,
        /// Human-readable step description
        step: String,
        /// Underlying error
        #[source]
        source: Box<FormError>,
    },

    /// Browser or protocol failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Injected script failed
    #[error("Script failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Form data could not be turned into a record
    #[error("Invalid form data: {message}")]
    Record {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FormError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a script error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Create a field-not-found error
    #[must_use]
    pub fn not_found(query: impl Into<String>) -> Self {
        Self::FieldNotFound {
            query: query.into(),
        }
    }

    /// Create a record error
    #[must_use]
    pub fn record(message: impl Into<String>) -> Self {
        Self::Record {
            message: message.into(),
        }
    }

    /// Create a stale-element error
    #[must_use]
    pub fn stale(element: impl Into<String>) -> Self {
        Self::StaleElement {
            element: element.into(),
        }
    }

    /// True if the handle's node was re-rendered away
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::StaleElement { .. })
    }

    /// True if this is a transient click interception, the only retryable kind
    #[must_use]
    pub const fn is_obscured(&self) -> bool {
        matches!(self, Self::ElementObscured { .. })
    }

    /// The innermost error, looking through `StepFailed` wrappers
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::StepFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
