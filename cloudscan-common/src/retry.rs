//! Bounded retry with exponential backoff
//!
//! Transient network/API failures are retried a fixed number of times;
//! anything `ScanError::is_transient` rejects fails immediately.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::{Result, ScanError};

/// Retry policy for a single logical operation
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            multiplier: 2,
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// No sleeping between attempts. Used by tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::ZERO,
            multiplier: 1,
        }
    }
}

/// Run `operation` until it succeeds, fails non-transiently, or the attempt
/// budget is exhausted. The last error is returned as-is.
pub async fn retry_with_backoff<T, F, Fut>(
    config: &RetryConfig,
    description: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = config.initial_backoff;

    for attempt in 1..=config.max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < config.max_attempts => {
                warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    description, attempt, config.max_attempts, backoff, err
                );
                tokio::time::sleep(backoff).await;
                backoff *= config.multiplier;
            }
            Err(err) => return Err(err),
        }
    }

    // 1..=max_attempts always returns from inside the loop
    unreachable!("retry loop exited without a result")
}
