//! Retry logic with exponential backoff for transient failures.
//!
//! Disabled unless a [`RetryConfig`] is supplied, and only ever applied to
//! idempotent reads. Uploads, searches and history records go out once.

use std::future::Future;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TransportError;

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first one.
    pub max_retries: u32,
    /// Base delay between retries (exponentially increased).
    #[serde(with = "millis")]
    pub base_delay: Duration,
    /// Maximum delay between retries.
    #[serde(with = "millis")]
    pub max_delay: Duration,
    /// Whether to add random jitter to delays.
    pub jitter: bool,
}

/// Delays are written as whole milliseconds in config files.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }
}

/// Outcome of a retried operation.
#[derive(Debug, Clone)]
pub struct RetryOutcome<T> {
    pub result: Result<T, TransportError>,
    /// Number of attempts made (1 = no retries needed).
    pub attempts: u32,
    pub total_duration: Duration,
}

impl<T> RetryOutcome<T> {
    pub fn into_result(self) -> Result<T, TransportError> {
        self.result
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the retry budget is spent. `None` config means a single attempt.
pub async fn execute_with_retry<T, F, Fut>(
    config: Option<&RetryConfig>,
    mut operation: F,
) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let start = Instant::now();
    let max_retries = config.map_or(0, |cfg| cfg.max_retries);
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                return RetryOutcome {
                    result: Ok(value),
                    attempts: attempt + 1,
                    total_duration: start.elapsed(),
                };
            }
            Err(err) => {
                let Some(cfg) = config else {
                    return RetryOutcome {
                        result: Err(err),
                        attempts: attempt + 1,
                        total_duration: start.elapsed(),
                    };
                };
                if attempt >= max_retries || !err.is_retryable() {
                    return RetryOutcome {
                        result: Err(err),
                        attempts: attempt + 1,
                        total_duration: start.elapsed(),
                    };
                }

                let delay = calculate_delay(cfg, attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "retry_scheduled");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Calculate delay for a retry attempt with exponential backoff.
fn calculate_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let base = config.base_delay.as_millis() as u64;
    let exponential = base.saturating_mul(2_u64.saturating_pow(attempt));
    let delay = exponential.min(config.max_delay.as_millis() as u64);

    if config.jitter {
        // Add 0-50% random jitter
        let jitter = fastrand::u64(0..=delay / 2);
        Duration::from_millis(delay + jitter)
    } else {
        Duration::from_millis(delay)
    }
}
