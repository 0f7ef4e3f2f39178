//! Layered configuration for the MediaCat client
//!
//! All sections are optional; anything left out takes its default. Sources
//! are applied in order, later ones winning:
//!
//! 1. built-in defaults
//! 2. a config file, `mediacat.{toml,yaml,json}` in the working directory or
//!    an explicit path
//! 3. environment variables prefixed `MEDIACAT`, nested with `__`
//!
//! ## Example TOML Configuration
//!
//! ```toml
//! log_level = "debug"
//! json_logs = false
//!
//! [transport]
//! base_url = "http://catalog.internal:8000"
//! api_prefix = "/api/v1"
//! timeout_secs = 30
//!
//! [transport.retry]
//! max_retries = 3
//! base_delay = 100
//! max_delay = 2000
//! jitter = true
//!
//! [ingest]
//! max_upload_bytes = 524288000
//!
//! [catalog]
//! page_size = 20
//! filter_policy = "keep_page"
//!
//! [search]
//! limit = 20
//! ```
//!
//! Environment overrides use the same paths, e.g.
//! `MEDIACAT__TRANSPORT__BASE_URL=https://media.example.com`.

use std::path::Path;

use catalog::CatalogConfig;
use ingest::IngestConfig;
use search::SearchConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use transport::TransportConfig;

/// Errors that can occur when loading configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigLoadError {
    #[error("failed to read configuration: {0}")]
    Source(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl From<config::ConfigError> for ConfigLoadError {
    fn from(err: config::ConfigError) -> Self {
        ConfigLoadError::Source(err.to_string())
    }
}

/// Top-level configuration for the whole client core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaCatConfig {
    /// `EnvFilter` directive for the binary's logging
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub json_logs: bool,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for MediaCatConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            transport: TransportConfig::default(),
            ingest: IngestConfig::default(),
            catalog: CatalogConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl MediaCatConfig {
    /// Load from an optional file plus `MEDIACAT__*` environment variables.
    ///
    /// With `path = None` a `mediacat.*` file in the working directory is
    /// used if present. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("mediacat").required(false),
        };
        let builder = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("MEDIACAT").separator("__"));

        let config: MediaCatConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "log_level must not be empty".to_string(),
            ));
        }
        self.transport
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("transport: {e}")))?;
        self.ingest
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("ingest: {e}")))?;
        self.catalog
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("catalog: {e}")))?;
        self.search
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("search: {e}")))?;
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let cfg = MediaCatConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.catalog.page_size, 20);
        assert_eq!(cfg.search.limit, 20);
    }

    #[test]
    fn loads_partial_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
log_level = "debug"

[transport]
base_url = "http://catalog.test:9000"

[catalog]
page_size = 12
filter_policy = "reset_to_first"
"#
        )
        .unwrap();

        let cfg = MediaCatConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.transport.base_url, "http://catalog.test:9000");
        assert_eq!(cfg.transport.timeout_secs, 30);
        assert_eq!(cfg.catalog.page_size, 12);
        assert_eq!(
            cfg.catalog.filter_policy,
            catalog::FilterPagePolicy::ResetToFirst
        );
        assert_eq!(cfg.search, SearchConfig::default());
    }

    #[test]
    fn invalid_section_is_reported_with_its_name() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[search]\nlimit = 0").unwrap();

        let err = MediaCatConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(ref msg) if msg.starts_with("search:")));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = MediaCatConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Source(_)));
    }
}
