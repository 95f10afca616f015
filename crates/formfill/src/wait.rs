//! Polling waits for elements that render asynchronously.
//!
//! Every fill step goes through [`Waiter`] instead of assuming its target is
//! already on the page.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::locator::{ElementHandle, Query, SearchContext};
use crate::result::{FormError, FormResult};

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Waiter for element readiness
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with the given options
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// The options this waiter polls with
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Wait until the first match of `query` is interactable and return it.
    ///
    /// Only the first match in document order is considered; later matches do
    /// not count even if they are ready sooner.
    pub fn until_interactable<C: SearchContext>(
        &self,
        ctx: &C,
        query: &Query,
    ) -> FormResult<C::Element> {
        let mut found = None;
        self.poll(&query.to_xpath(), || {
            if let Some(element) = ctx.find_all(query)?.into_iter().next() {
                if not_ready_if_stale(element.is_interactable())? {
                    found = Some(element);
                    return Ok(true);
                }
            }
            Ok(false)
        })?;
        found.ok_or_else(|| FormError::not_found(query.to_xpath()))
    }

    /// Wait until `predicate` returns true; returns the time spent waiting
    pub fn wait_for<F>(&self, description: &str, predicate: F) -> FormResult<Duration>
    where
        F: FnMut() -> FormResult<bool>,
    {
        self.poll(description, predicate)
    }

    fn poll<F>(&self, description: &str, mut check: F) -> FormResult<Duration>
    where
        F: FnMut() -> FormResult<bool>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        loop {
            if check()? {
                return Ok(start.elapsed());
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(FormError::NotReady {
                    query: description.to_string(),
                    elapsed_ms: elapsed.as_millis() as u64,
                });
            }
            debug!(target: "formfill::wait", %description, ?elapsed, "not ready, polling");
            std::thread::sleep(self.options.poll_interval().min(timeout - elapsed));
        }
    }
}

/// A handle that went stale between lookup and check is simply not ready yet
pub(crate) fn not_ready_if_stale(ready: FormResult<bool>) -> FormResult<bool> {
    match ready {
        Err(e) if e.is_stale() => Ok(false),
        other => other,
    }
}
