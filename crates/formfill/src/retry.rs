//! Retry for clicks swallowed by transitioning overlays.
//!
//! Custom widgets on the form close with an animation. A click issued while a
//! dropdown is still fading out lands on the dropdown instead of the target and
//! surfaces as [`FormError::ElementObscured`]. That one failure is retried after
//! a fixed delay; every other error is returned untouched.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::result::{FormError, FormResult};

/// Default number of attempts (including the first)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay between attempts (1 second)
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// How many times to retry an obscured click, and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves as one.
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    #[must_use]
    pub const fn new(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            delay_ms,
        }
    }

    /// Set maximum attempts
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay in milliseconds
    #[must_use]
    pub const fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Delay as Duration
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Whether `err` is worth another attempt
    #[must_use]
    pub const fn is_retryable(err: &FormError) -> bool {
        err.is_obscured()
    }
}

/// Run `op`, re-running it from scratch while it fails with `ElementObscured`.
///
/// `op` must re-resolve its targets on every call. On exhaustion the last
/// `ElementObscured` is returned with `attempts` set to the number of calls made.
pub fn retry_obscured<T, F>(policy: &RetryPolicy, name: &str, mut op: F) -> FormResult<T>
where
    F: FnMut() -> FormResult<T>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if RetryPolicy::is_retryable(&err) => {
                if attempt >= max_attempts {
                    return Err(annotate(err, attempt));
                }
                warn!(
                    target: "formfill::retry",
                    operation = name,
                    attempt,
                    max_attempts,
                    %err,
                    "click intercepted, retrying momentarily"
                );
                std::thread::sleep(policy.delay());
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn annotate(err: FormError, attempts: u32) -> FormError {
    match err {
        FormError::ElementObscured {
            element,
            obscured_by,
            ..
        } => FormError::ElementObscured {
            element,
            obscured_by,
            attempts,
        },
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn obscured() -> FormError {
        FormError::ElementObscured {
            element: "<li>".into(),
            obscured_by: "<div class=\"chosen-drop\">".into(),
            attempts: 1,
        }
    }

    /// Fails with `ElementObscured` `k` times, then succeeds
    fn flaky(k: u32) -> impl FnMut() -> FormResult<u32> {
        let mut calls = 0;
        move || {
            calls += 1;
            if calls <= k {
                Err(obscured())
            } else {
                Ok(calls)
            }
        }
    }

    mod policy_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let policy = RetryPolicy::default();
            assert_eq!(policy.max_attempts, 3);
            assert_eq!(policy.delay(), Duration::from_secs(1));
        }

        #[test]
        fn test_builders() {
            let policy = RetryPolicy::default().with_max_attempts(5).with_delay(250);
            assert_eq!(policy, RetryPolicy::new(5, 250));
            assert_eq!(policy.delay(), Duration::from_millis(250));
        }

        #[test]
        fn test_only_obscured_is_retryable() {
            assert!(RetryPolicy::is_retryable(&obscured()));
            assert!(!RetryPolicy::is_retryable(&FormError::not_found("//x")));
            assert!(!RetryPolicy::is_retryable(&FormError::NotReady {
                query: "//x".into(),
                elapsed_ms: 1,
            }));
        }
    }

    mod retry_tests {
        use super::*;

        #[test]
        fn test_success_first_try() {
            let policy = RetryPolicy::new(3, 0);
            assert_eq!(retry_obscured(&policy, "op", flaky(0)).unwrap(), 1);
        }

        #[test]
        fn test_exhausted_reports_attempts() {
            let policy = RetryPolicy::new(3, 0);
            match retry_obscured(&policy, "op", flaky(10)).unwrap_err() {
                FormError::ElementObscured { attempts, .. } => assert_eq!(attempts, 3),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_other_errors_not_retried() {
            let policy = RetryPolicy::new(5, 0);
            let mut calls = 0;
            let err = retry_obscured(&policy, "op", || -> FormResult<()> {
                calls += 1;
                Err(FormError::not_found("//input"))
            })
            .unwrap_err();
            assert_eq!(calls, 1);
            assert!(matches!(err, FormError::FieldNotFound { .. }));
        }

        #[test]
        fn test_zero_attempts_runs_once() {
            let policy = RetryPolicy::new(0, 0);
            let mut calls = 0;
            let _ = retry_obscured(&policy, "op", || -> FormResult<()> {
                calls += 1;
                Err(obscured())
            });
            assert_eq!(calls, 1);
        }

        #[test]
        fn test_delay_between_attempts() {
            let policy = RetryPolicy::new(3, 20);
            let start = std::time::Instant::now();
            retry_obscured(&policy, "op", flaky(2)).unwrap();
            assert!(start.elapsed() >= Duration::from_millis(40));
        }
    }

    proptest! {
        #[test]
        fn prop_succeeds_when_budget_exceeds_failures(k in 0u32..6, extra in 1u32..4) {
            let n = k + extra;
            let mut calls = 0;
            let mut inner = flaky(k);
            let result = retry_obscured(&RetryPolicy::new(n, 0), "op", || {
                calls += 1;
                inner()
            });
            prop_assert!(result.is_ok());
            prop_assert_eq!(calls, k + 1);
        }

        #[test]
        fn prop_fails_after_exactly_n_calls(n in 1u32..6, surplus in 0u32..4) {
            let k = n + surplus;
            let mut calls = 0;
            let mut inner = flaky(k);
            let result = retry_obscured(&RetryPolicy::new(n, 0), "op", || {
                calls += 1;
                inner()
            });
            prop_assert_eq!(calls, n);
            let is_obscured_failure = matches!(result, Err(FormError::ElementObscured { attempts, .. }) if attempts == n);
            prop_assert!(is_obscured_failure);
        }
    }
}
