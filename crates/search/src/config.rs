//! Search configuration.
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Results requested per search.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Extensions accepted for search-by-image, case-insensitive.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            image_extensions: default_image_extensions(),
        }
    }
}

impl SearchConfig {
    /// `limit` forced into the range the service accepts.
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    pub fn accepts_image_extension(&self, extension: &str) -> bool {
        self.image_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    pub fn validate(&self) -> Result<(), SearchConfigError> {
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(SearchConfigError::Limit(self.limit));
        }
        if self.image_extensions.is_empty() {
            return Err(SearchConfigError::NoImageExtensions);
        }
        Ok(())
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_image_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "webp"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SearchConfigError {
    #[error("search limit must be within 1..={MAX_LIMIT}, got {0}")]
    Limit(u32),
    #[error("no image extensions are accepted for search-by-image")]
    NoImageExtensions,
}
