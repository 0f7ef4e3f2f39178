//! Listing configuration.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest page the service will hand out.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Items per page; fixed for the lifetime of a view.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// What happens to the current page when the type filter changes.
    #[serde(default)]
    pub filter_policy: FilterPagePolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            filter_policy: FilterPagePolicy::default(),
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<(), CatalogConfigError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(CatalogConfigError::PageSize(self.page_size));
        }
        Ok(())
    }
}

/// Page handling on a filter change.
///
/// `KeepPage` refetches the current page under the new filter and lets the
/// server's page count clamp it afterwards. `ResetToFirst` jumps straight to
/// page 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPagePolicy {
    #[default]
    KeepPage,
    ResetToFirst,
}

fn default_page_size() -> u32 {
    20
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogConfigError {
    #[error("page_size must be within 1..={MAX_PAGE_SIZE}, got {0}")]
    PageSize(u32),
}
