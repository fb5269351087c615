//! Retry with exponential backoff for marketplace and supplier calls.
//!
//! With the default `max_retries = 0` every call is attempted exactly once.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RetryConfig;

/// Failure of a single attempt, classified by whether another try may help.
#[derive(Debug)]
pub enum AttemptError {
    /// Transport failure, rate limit, or server error.
    Retryable(anyhow::Error),
    /// Client error or malformed payload; retrying would not change it.
    Fatal(anyhow::Error),
}

/// Whether an HTTP status is worth retrying (429 and 5xx).
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}

/// Delay before the given retry attempt (1-based).
pub fn backoff_delay(policy: &RetryConfig, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_secs(policy.backoff_base_secs.saturating_mul(factor))
}

/// Run `op` until it succeeds, fails fatally, or retries are exhausted.
pub async fn with_retry<T, F, Fut>(policy: &RetryConfig, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, AttemptError>>,
{
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            let delay = backoff_delay(policy, attempt);
            debug!(attempt, delay_ms = delay.as_millis() as u64, label, "Retrying call");
            tokio::time::sleep(delay).await;
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(e)) => return Err(e),
            Err(AttemptError::Retryable(e)) => {
                if attempt >= policy.max_retries {
                    return Err(e);
                }
                warn!(attempt, label, error = %e, "Retryable failure");
                attempt += 1;
            }
        }
    }
}
