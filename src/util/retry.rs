//! Retry with a bounded attempt count.

use std::future::Future;
use std::time::Duration;

use crate::error::VelaError;

/// Retry policy configuration.
///
/// The external generation service is retried with a fixed inter-attempt
/// delay rather than exponential backoff: its failures are either
/// transient connectivity blips or sustained outages, and the whole
/// exchange is bounded by the caller's fallback path anyway.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Execute an async operation, retrying retryable errors up to the
    /// attempt cap. Terminal errors return immediately.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, VelaError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, VelaError>>,
    {
        let mut last_error = None;

        for attempt in 0..self.max_attempts.max(1) {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !e.is_retryable() || attempt + 1 >= self.max_attempts {
                        return Err(e);
                    }

                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Retrying after error"
                    );

                    tokio::time::sleep(self.delay).await;
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| VelaError::Timeout(0)))
    }
}
