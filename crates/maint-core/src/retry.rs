//! Retry with linear backoff for transient store errors

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Linear backoff policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay unit in milliseconds; retry `n` waits `n * base_delay_ms`
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
        }
    }

    /// With a retry count
    #[inline]
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// With a delay unit
    #[inline]
    #[must_use]
    pub fn with_base_delay(mut self, base: Duration) -> Self {
        self.base_delay_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Delay before retry number `retry` (1-based)
    #[inline]
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(u64::from(retry)))
    }
}

/// Run `attempt`, retrying transient errors per `policy`.
///
/// Non-transient errors surface immediately; after the last retry the final
/// transient error is returned.
pub async fn retry_transient<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut attempt: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut retry = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && retry < policy.max_retries => {
                retry += 1;
                let delay = policy.delay_for(retry);
                tracing::warn!(
                    operation,
                    retry,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient store error, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
