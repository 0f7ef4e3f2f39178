//! Catalog service transport.
//!
//! Everything the client core sends to or receives from the catalog service
//! crosses the [`CatalogApi`] trait. The production implementation is
//! [`HttpCatalogApi`]; tests and alternative backends supply their own.
//!
//! ## Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | [`list_assets`](CatalogApi::list_assets) | `GET /assets?page&page_size&type` |
//! | [`get_asset`](CatalogApi::get_asset) | `GET /assets/{id}` |
//! | [`upload_asset`](CatalogApi::upload_asset) | `POST /assets` (multipart) |
//! | [`delete_asset`](CatalogApi::delete_asset) | `DELETE /assets/{id}` |
//! | [`asset_stats`](CatalogApi::asset_stats) | `GET /assets/stats` |
//! | [`search_text`](CatalogApi::search_text) | `POST /search/text` |
//! | [`search_image`](CatalogApi::search_image) | `POST /search/image` (multipart) |
//! | [`record_history`](CatalogApi::record_history) | `POST /history` |
//!
//! ## Example
//!
//! ```no_run
//! use transport::{CatalogApi, HttpCatalogApi, ListParams, TransportConfig};
//!
//! # async fn demo() -> Result<(), transport::TransportError> {
//! let api = HttpCatalogApi::new(TransportConfig::default())?;
//! let page = api
//!     .list_assets(ListParams { page: 1, page_size: 20, media_type: None })
//!     .await?;
//! println!("{} of {} assets", page.items.len(), page.total);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod http;
mod retry;
mod serde_time;
mod types;

pub use crate::config::TransportConfig;
pub use crate::error::TransportError;
pub use crate::http::HttpCatalogApi;
pub use crate::retry::{execute_with_retry, RetryConfig, RetryOutcome};
pub use crate::types::{
    AssetPage, AssetRef, AssetStats, FilePayload, FlatHit, HistoryAction, HistoryRecord,
    ListParams, MatchType, MediaType, SearchResponse, SearchResult, UploadRequest,
};

/// The catalog service as seen by the client core.
#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of the asset listing.
    async fn list_assets(&self, params: ListParams) -> Result<AssetPage, TransportError>;
    /// Fetch a single asset.
    async fn get_asset(&self, id: &str) -> Result<AssetRef, TransportError>;
    /// Upload one file, returning the asset the server created for it.
    async fn upload_asset(&self, request: UploadRequest) -> Result<AssetRef, TransportError>;
    async fn delete_asset(&self, id: &str) -> Result<(), TransportError>;
    async fn asset_stats(&self) -> Result<AssetStats, TransportError>;
    /// Free-text semantic query.
    async fn search_text(&self, query: &str, limit: u32) -> Result<SearchResponse, TransportError>;
    /// Query by example image.
    async fn search_image(
        &self,
        image: &FilePayload,
        limit: Option<u32>,
    ) -> Result<SearchResponse, TransportError>;
    /// Log an interaction with an asset. The response body is ignored.
    async fn record_history(
        &self,
        asset_id: &str,
        action: HistoryAction,
    ) -> Result<(), TransportError>;
}
