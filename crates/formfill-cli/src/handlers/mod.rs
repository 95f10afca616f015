//! Command handlers, kept out of main.rs so they can be driven from tests
//! with scripted prompts and a fixed date.

pub mod check;
pub mod run;
#[cfg(feature = "browser")]
pub mod session;
pub mod slot;

pub use check::execute_check;
pub use run::{execute_run, RunOutcome};
pub use slot::execute_slot;

use formfill::{EventFormRecord, FillConfig, Overrides};
use std::path::Path;
use tracing::debug;

use crate::commands::DataArgs;
use crate::error::CliResult;

/// Load the record named by `data`, applying `overrides` and the about file
pub fn load_record(data: &DataArgs, mut overrides: Overrides) -> CliResult<EventFormRecord> {
    if let Some(about) = &data.about {
        let html = std::fs::read_to_string(about)?;
        debug!(path = %about.display(), bytes = html.len(), "Read about_html");
        let _ = overrides.insert("about_html".to_string(), html);
    }
    Ok(EventFormRecord::from_yaml_file(&data.data, &overrides)?)
}

/// Timing from `path`, or the defaults
pub fn load_timing(path: Option<&Path>) -> CliResult<FillConfig> {
    match path {
        Some(path) => Ok(FillConfig::from_yaml_file(path)?),
        None => Ok(FillConfig::default()),
    }
}
