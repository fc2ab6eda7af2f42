//! Generic exponential-backoff wrapper for fallible fetch calls.
//!
//! Wraps any zero-argument async operation returning [`FetchResult`]:
//! retryable failures sleep `base_delay * 2^(attempt-1)` and try again,
//! terminal failures propagate immediately, and an exhausted budget surfaces
//! as [`FetchError::RetriesExhausted`] carrying the last underlying failure.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{calculate_backoff, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};
use crate::fetcher::{FetchError, FetchResult};
use crate::metrics::RunMetrics;

/// Retry budget and backoff base for one category of fetch calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt. Zero means exactly one
    /// attempt and no sleeping.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with an explicit budget and base delay.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Backoff delay before retry `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        calculate_backoff(self.base_delay, attempt)
    }
}

/// Invoke `op` under `policy`, sleeping between retryable failures.
///
/// Performs at most `policy.max_retries + 1` invocations. A non-retryable
/// failure is propagated untouched without consuming any retry budget.
///
/// The sleep blocks the calling task; shutdown is only observed between
/// whole fetch units, not mid-backoff.
pub async fn with_backoff<T, F, Fut>(policy: &RetryPolicy, op_name: &str, mut op: F) -> FetchResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(op = op_name, attempt, "call recovered after retry");
                }
                return Ok(value);
            }
            Err(err) if !err.is_retryable() => {
                debug!(op = op_name, error = %err, "terminal failure, not retrying");
                return Err(err);
            }
            Err(err) => {
                if attempt > policy.max_retries {
                    warn!(
                        op = op_name,
                        attempts = attempt,
                        error = %err,
                        "retry budget exhausted"
                    );
                    return Err(FetchError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }

                let delay = policy.backoff_delay(attempt);
                warn!(
                    op = op_name,
                    attempt,
                    max_attempts = policy.max_retries + 1,
                    delay_secs = delay.as_secs_f64(),
                    error = %err,
                    "retryable failure, backing off"
                );
                RunMetrics::record_retry(op_name, delay);
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
