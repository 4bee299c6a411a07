//! Bounded retry for cache operations.

use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

use crate::cache::keys;
use crate::error::Result;

/// How many times a failed cache operation is retried and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = `max_retries + 1`
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the
/// retries run out. The last error is returned on exhaustion.
///
/// The delay only suspends the calling task.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    op_name: &str,
    key: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retries_left = policy.max_retries;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) if retries_left == 0 => {
                error!(
                    op = op_name,
                    pattern = %keys::pattern(key),
                    attempts = policy.max_retries + 1,
                    "Cache operation failed after retries: {}",
                    err
                );
                return Err(err);
            }
            Err(err) => {
                warn!(
                    op = op_name,
                    pattern = %keys::pattern(key),
                    retries_left,
                    "Cache operation failed, retrying: {}",
                    err
                );
                retries_left -= 1;
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}
