//! Bounded poll-until-condition primitive.
//!
//! Every locator assertion and every actionability wait goes through
//! [`poll_until`], so UI asynchrony (animations, debounced renders) is
//! absorbed without explicit sleeps.

use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

/// Result of a single check
#[derive(Debug, Clone)]
pub enum AssertionCheckResult<T = ()> {
    /// Condition holds, carrying the observed value
    Pass(T),
    /// Condition does not hold yet; message describes what was observed
    Fail(String),
}

impl<T> AssertionCheckResult<T> {
    /// Check if the result is a pass
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass(_))
    }

    /// Check if the result is a fail
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total timeout duration
    pub timeout: Duration,
    /// Interval between retry attempts
    pub poll_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with timeout
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: Duration::from_millis(100),
        }
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Check once, never retry
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            timeout: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
        }
    }
}

/// Error when polling gives up
#[derive(Debug, Clone)]
pub struct RetryError {
    /// Last failure message
    pub message: String,
    /// Number of attempts made
    pub attempts: usize,
    /// Total duration of all attempts
    pub duration: Duration,
}

impl std::fmt::Display for RetryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gave up after {} attempt(s) ({:.2}s): {}",
            self.attempts,
            self.duration.as_secs_f64(),
            self.message
        )
    }
}

impl std::error::Error for RetryError {}

/// Poll `check` until it passes or `config.timeout` elapses.
///
/// The check always runs at least once. An `Err` from the check is a hard
/// failure (driver error, strict-mode violation) and is returned without
/// further polling; a `Fail` is retried. On timeout the last `Fail` message is
/// handed to `on_timeout` to build the caller's error.
///
/// # Errors
///
/// Returns the check's own error, or the error built by `on_timeout`
pub async fn poll_until<T, F, Fut, E>(
    config: &RetryConfig,
    mut check: F,
    on_timeout: E,
) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<AssertionCheckResult<T>>>,
    E: FnOnce(RetryError) -> E2eError,
{
    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;
        let last = match check().await? {
            AssertionCheckResult::Pass(value) => {
                if attempts > 1 {
                    tracing::trace!(attempts, elapsed = ?start.elapsed(), "condition settled");
                }
                return Ok(value);
            }
            AssertionCheckResult::Fail(msg) => msg,
        };

        let elapsed = start.elapsed();
        if elapsed >= config.timeout {
            return Err(on_timeout(RetryError {
                message: last,
                attempts,
                duration: elapsed,
            }));
        }

        let remaining = config.timeout - elapsed;
        tokio::time::sleep(config.poll_interval.min(remaining)).await;
    }
}
