//! Configuration types for upload acceptance.
//!
//! [`IngestConfig`] decides which selected files may become transfer items.
//! Files outside the accepted extension set, empty files, and files above the
//! size cap are rejected at enqueue time and never reach the network.
//!
//! # Quick Start
//!
//! ```rust
//! use ingest::IngestConfig;
//!
//! let config = IngestConfig::default();
//! config.validate().expect("default config is valid");
//! assert!(config.accepted.image.iter().any(|ext| ext == "webp"));
//! ```
//!
//! # Serialization
//!
//! ```json
//! {
//!   "accepted": {
//!     "image": ["jpg", "jpeg", "png", "gif", "webp"],
//!     "video": ["mp4", "mov", "avi", "webm"],
//!     "audio": ["mp3", "wav", "ogg", "m4a", "flac"]
//!   },
//!   "max_upload_bytes": 524288000
//! }
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;
use transport::MediaType;

/// Default upload cap: 500 MiB, matching the service's own limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Runtime configuration for upload acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Accepted file extensions, grouped by the media type they map to.
    #[serde(default)]
    pub accepted: AcceptedExtensions,
    /// Largest file accepted for upload. `None` disables the check.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: Option<u64>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            accepted: AcceptedExtensions::default(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl IngestConfig {
    /// Check the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoAcceptedExtensions`] when every list is empty
    /// - [`ConfigError::InvalidExtension`] for entries with a dot, whitespace or nothing at all
    /// - [`ConfigError::AmbiguousExtension`] when one extension maps to two media types
    /// - [`ConfigError::ZeroUploadLimit`] for `max_upload_bytes = Some(0)`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accepted.is_empty() {
            return Err(ConfigError::NoAcceptedExtensions);
        }
        let mut seen: Vec<(String, MediaType)> = Vec::new();
        for (kind, list) in self.accepted.lists() {
            for ext in list {
                if ext.is_empty() || ext.contains('.') || ext.chars().any(char::is_whitespace) {
                    return Err(ConfigError::InvalidExtension(ext.clone()));
                }
                let ext = ext.to_ascii_lowercase();
                if let Some((_, other)) = seen.iter().find(|(e, k)| *e == ext && *k != kind) {
                    return Err(ConfigError::AmbiguousExtension {
                        extension: ext,
                        first: *other,
                        second: kind,
                    });
                }
                seen.push((ext, kind));
            }
        }
        if self.max_upload_bytes == Some(0) {
            return Err(ConfigError::ZeroUploadLimit);
        }
        Ok(())
    }
}

/// Extension lists per media type. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedExtensions {
    #[serde(default)]
    pub image: Vec<String>,
    #[serde(default)]
    pub video: Vec<String>,
    #[serde(default)]
    pub audio: Vec<String>,
}

impl Default for AcceptedExtensions {
    fn default() -> Self {
        fn owned(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }
        Self {
            image: owned(&["jpg", "jpeg", "png", "gif", "webp"]),
            video: owned(&["mp4", "mov", "avi", "webm"]),
            audio: owned(&["mp3", "wav", "ogg", "m4a", "flac"]),
        }
    }
}

impl AcceptedExtensions {
    /// Media type an extension maps to, if it is accepted at all.
    pub fn classify(&self, extension: &str) -> Option<MediaType> {
        self.lists().find_map(|(kind, list)| {
            list.iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(extension))
                .then_some(kind)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty() && self.video.is_empty() && self.audio.is_empty()
    }

    fn lists(&self) -> impl Iterator<Item = (MediaType, &Vec<String>)> {
        [
            (MediaType::Image, &self.image),
            (MediaType::Video, &self.video),
            (MediaType::Audio, &self.audio),
        ]
        .into_iter()
    }
}

fn default_max_upload_bytes() -> Option<u64> {
    Some(DEFAULT_MAX_UPLOAD_BYTES)
}

/// Configuration validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("no file extensions are accepted for upload")]
    NoAcceptedExtensions,
    #[error("invalid extension entry `{0}` (expected a bare extension such as `jpg`)")]
    InvalidExtension(String),
    #[error("extension `{extension}` is listed for both {first} and {second}")]
    AmbiguousExtension {
        extension: String,
        first: MediaType,
        second: MediaType,
    },
    #[error("max_upload_bytes must be greater than zero")]
    ZeroUploadLimit,
}
