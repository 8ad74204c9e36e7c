//! Retry handling for transient transport failures.
//!
//! The PDK retry loop is bounded by a backoff ceiling rather than an attempt
//! count: each failed attempt sleeps the current backoff and doubles it, and
//! the loop gives up once the next scheduled wait would exceed the ceiling.

use crate::errors::PdkResult;
use std::time::Duration;
use tracing::warn;

/// Retry configuration for exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// First backoff duration.
    pub initial_backoff: Duration,
    /// Maximum scheduled wait; the loop gives up rather than sleeping longer.
    pub backoff_ceiling: Duration,
    /// Multiplier applied to the backoff after each sleep.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs_f64(3.75),
            backoff_ceiling: Duration::from_secs(120),
            multiplier: 2.0,
        }
    }
}

/// Retry executor with exponential backoff.
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Creates a new retry executor.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Executes an operation, retrying transient failures.
    ///
    /// Semantic failures (non-retryable errors) and exhaustion of the backoff
    /// budget both surface the last observed error to the caller.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> PdkResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = PdkResult<T>>,
    {
        let mut backoff = self.config.initial_backoff;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !error.is_retryable() {
                        return Err(error);
                    }

                    if backoff > self.config.backoff_ceiling {
                        return Err(error);
                    }

                    warn!(
                        wait_seconds = backoff.as_secs_f64(),
                        error = %error,
                        "transient failure, retrying after backoff"
                    );

                    tokio::time::sleep(backoff).await;
                    backoff = backoff.mul_f64(self.config.multiplier);
                }
            }
        }
    }
}
