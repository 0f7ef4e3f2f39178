//! Catalog browsing
//!
//! [`CatalogQuery`] owns the listing state (page, page size, type filter) and
//! turns it into list requests. Responses are reconciled last-request-wins:
//! only the most recently issued request may update the [`CatalogView`], and
//! the server's page count is authoritative, so a page that no longer exists
//! is clamped and refetched.
//!
//! [`HistoryRecorder`] sits beside it and logs views, downloads and copies
//! in the background.
//!
//! ## Usage
//!
//! ```no_run
//! use catalog::{CatalogConfig, CatalogQuery, TypeFilter};
//! use transport::{HttpCatalogApi, TransportConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpCatalogApi::new(TransportConfig::default())?;
//! let mut query = CatalogQuery::new(CatalogConfig::default());
//!
//! query.fetch_page(&api).await;
//! query.change_type_filter(&api, TypeFilter::Video).await;
//!
//! let view = query.view();
//! println!("page {}/{}: {} videos", view.page, view.total_pages, view.items.len());
//! # Ok(())
//! # }
//! ```

mod config;
mod history;
mod query;

pub use crate::config::{CatalogConfig, CatalogConfigError, FilterPagePolicy, MAX_PAGE_SIZE};
pub use crate::history::{open_asset, open_asset_tracked, HistoryRecorder};
pub use crate::query::{
    Applied, CatalogQuery, CatalogView, LoadStatus, PageRequest, TypeFilter, UnknownTypeFilter,
};
