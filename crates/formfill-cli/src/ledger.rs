//! Dates already submitted, kept as a JSON array of `YYYY-MM-DD` strings.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CliError, CliResult};

/// Default ledger file name
pub const DEFAULT_LEDGER: &str = "submitted_dates.json";

/// Submitted dates, in submission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    path: PathBuf,
    dates: Vec<String>,
}

impl Ledger {
    /// Load from `path`; a missing file is an empty ledger
    pub fn load(path: impl Into<PathBuf>) -> CliResult<Self> {
        let path = path.into();
        let dates = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| CliError::ledger(&path, format!("expected a list of dates: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, dates })
    }

    /// File backing the ledger
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Submitted dates
    #[must_use]
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// Whether `date` was submitted
    #[must_use]
    pub fn contains(&self, date: &str) -> bool {
        self.dates.iter().any(|d| d == date)
    }

    /// Append `date` and rewrite the file. Memory is untouched if the write fails.
    pub fn record(&mut self, date: &str) -> CliResult<()> {
        let mut next = self.dates.clone();
        next.push(date.to_string());
        std::fs::write(&self.path, serde_json::to_string(&next)?)?;
        self.dates = next;
        info!(path = %self.path.display(), date, "Ledger updated");
        Ok(())
    }
}
