//! Timing configuration for the fill.
//!
//! One [`FillConfig`] is handed to every component at construction; nothing
//! reads timing from globals.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::result::FormResult;
use crate::retry::RetryPolicy;
use crate::wait::WaitOptions;

/// Default wait between labeled-input lookups (1 second)
pub const DEFAULT_LABELED_POLL_MS: u64 = 1_000;

/// Polling for labeled inputs that appear only after a slow transition
///
/// With `timeout_ms: None` the lookup polls forever, which is how the form has
/// always been driven: an input that never renders hangs the fill until the
/// process is interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabeledClickPolicy {
    /// Sleep between lookups in milliseconds
    pub interval_ms: u64,
    /// Give up with `NotReady` after this long; `None` never gives up
    pub timeout_ms: Option<u64>,
}

impl Default for LabeledClickPolicy {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_LABELED_POLL_MS,
            timeout_ms: None,
        }
    }
}

impl LabeledClickPolicy {
    /// Set the poll interval in milliseconds
    #[must_use]
    pub const fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Bound the poll
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Bound as Duration, if any
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// All timing knobs of a fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    /// Readiness waits
    pub wait: WaitOptions,
    /// Intercepted-click retries
    pub retry: RetryPolicy,
    /// Labeled-input polling
    pub labeled: LabeledClickPolicy,
}

impl FillConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set wait options
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Set retry policy
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set labeled-input polling
    #[must_use]
    pub const fn with_labeled(mut self, labeled: LabeledClickPolicy) -> Self {
        self.labeled = labeled;
        self
    }

    /// Millisecond-scale timings for tests against an in-memory page
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            wait: WaitOptions {
                timeout_ms: 200,
                poll_interval_ms: 5,
            },
            retry: RetryPolicy {
                max_attempts: 3,
                delay_ms: 5,
            },
            labeled: LabeledClickPolicy {
                interval_ms: 5,
                timeout_ms: Some(200),
            },
        }
    }

    /// Parse from YAML; absent keys keep their defaults
    pub fn from_yaml_str(source: &str) -> FormResult<Self> {
        Ok(serde_yaml_ng::from_str(source)?)
    }

    /// Read from a YAML file
    pub fn from_yaml_file(path: &Path) -> FormResult<Self> {
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_defaults() {
        let config = FillConfig::default();
        assert_eq!(config.wait.timeout(), Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay(), Duration::from_secs(1));
        assert_eq!(config.labeled.interval(), Duration::from_secs(1));
        assert_eq!(config.labeled.timeout(), None);
    }

    #[test]
    fn test_yaml_partial_override() {
        let config = FillConfig::from_yaml_str(
            "wait:\n  timeout_ms: 10000\nretry:\n  max_attempts: 5\nlabeled:\n  timeout_ms: 60000\n",
        )
        .unwrap();
        assert_eq!(config.wait.timeout_ms, 10_000);
        assert_eq!(config.wait.poll_interval_ms, 500);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay_ms, 1_000);
        assert_eq!(config.labeled.timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        // An empty document deserializes as unit; `{}` is the empty mapping
        assert_eq!(
            FillConfig::from_yaml_str("{}").unwrap(),
            FillConfig::default()
        );
    }

    #[test]
    fn test_builders() {
        let config = FillConfig::new()
            .with_wait(WaitOptions::new().with_timeout(750))
            .with_retry(RetryPolicy::new(1, 0))
            .with_labeled(
                LabeledClickPolicy::default()
                    .with_interval(10)
                    .with_timeout(20),
            );
        assert_eq!(config.wait.timeout(), Duration::from_millis(750));
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.labeled.interval_ms, 10);
        assert_eq!(config.labeled.timeout_ms, Some(20));
    }
}
