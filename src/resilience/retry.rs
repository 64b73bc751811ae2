//! # Bounded Retry Policy
//!
//! Wraps a fallible async operation with a fixed number of retries and a
//! backoff between attempts. Errors that can never succeed on a retry
//! (see [`WarmerError::is_retryable`]) are returned immediately.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::RunRetryConfig;
use crate::error::{Result, WarmerError};

/// Delay schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed(Duration),
    /// `base * 2^retry`, capped at `max`
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay before retry number `retry` (zero-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => {
                let factor = 2u32.saturating_pow(retry);
                base.checked_mul(factor).unwrap_or(max).min(max)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Backoff) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self::new(max_retries, Backoff::Fixed(delay))
    }

    pub fn from_config(config: &RunRetryConfig) -> Self {
        Self::fixed(config.max_retries, config.backoff())
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error, or
    /// the retry budget is spent. The last error is returned unchanged.
    pub async fn execute<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retries = 0u32;
        loop {
            let error: WarmerError = match operation().await {
                Ok(value) => {
                    if retries > 0 {
                        info!(
                            operation = %operation_name,
                            retries = retries,
                            "Operation succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if !error.is_retryable() {
                error!(
                    operation = %operation_name,
                    error = %error,
                    "Operation failed with non-retryable error"
                );
                return Err(error);
            }

            if retries >= self.max_retries {
                error!(
                    operation = %operation_name,
                    attempts = retries + 1,
                    error = %error,
                    "Operation failed; retry budget exhausted"
                );
                return Err(error);
            }

            let delay = self.backoff.delay_for(retries);
            warn!(
                operation = %operation_name,
                attempt = retries + 1,
                max_attempts = self.max_attempts(),
                retry_in_seconds = delay.as_secs(),
                error = %error,
                "Operation failed; scheduling retry"
            );
            tokio::time::sleep(delay).await;
            retries += 1;
        }
    }
}
