use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retry::RetryConfig;
use crate::TransportError;

/// How the client reaches the catalog service.
///
/// # Example
/// ```
/// use transport::TransportConfig;
///
/// let cfg = TransportConfig {
///     base_url: "https://assets.example.com".into(),
///     api_token: Some("secret".into()),
///     ..TransportConfig::default()
/// };
/// assert_eq!(cfg.api_root(), "https://assets.example.com/api/v1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Scheme + host (+ optional port) of the service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path prefix every endpoint lives under.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Sent as `Authorization: Bearer <token>` when set.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Overall request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,
    /// Backoff policy for idempotent reads. `None` disables retries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            pool_max_idle_per_host: default_pool_max_idle(),
            retry: None,
        }
    }
}

impl TransportConfig {
    /// Base URL joined with the API prefix, without a trailing slash.
    pub fn api_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(TransportError::InvalidConfig("base_url must not be empty".into()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(TransportError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got `{base}`"
            )));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(TransportError::InvalidConfig(
                "timeouts must be at least one second".into(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_pool_max_idle() -> usize {
    8
}
