//! Workspace umbrella crate for the MediaCat client core.
//!
//! This crate wires the component crates to one service connection so
//! callers get uploads, browsing, search and history behind a single
//! [`MediaCatalog`] value. Each component keeps exclusive ownership of its
//! own state; the facade only hands them the shared [`CatalogApi`].

pub mod config;

pub use catalog::{
    Applied, CatalogConfig, CatalogQuery, CatalogView, FilterPagePolicy, HistoryRecorder,
    LoadStatus, PageRequest, TypeFilter, open_asset, open_asset_tracked,
};
pub use ingest::{
    Enqueued, IngestConfig, IngestError, Rejected, TransferEvent, TransferId, TransferItem,
    TransferObserver, TransferStatus, UploadOrchestrator, UploadSummary,
};
pub use search::{
    SearchConfig, SearchDispatcher, SearchError, SearchMode, SearchQuery, SearchTicket, normalize,
};
pub use transport::{
    AssetPage, AssetRef, AssetStats, CatalogApi, FilePayload, HistoryAction, HttpCatalogApi,
    MatchType, MediaType, SearchResponse, SearchResult, TransportConfig, TransportError,
};

pub use crate::config::{ConfigLoadError, MediaCatConfig};

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;

/// The client core: one upload queue, one listing, one search box and the
/// history side channel, all talking to the same service.
pub struct MediaCatalog {
    api: Arc<dyn CatalogApi>,
    pub uploads: UploadOrchestrator,
    pub listing: CatalogQuery,
    pub search: SearchDispatcher,
    pub history: HistoryRecorder,
}

impl MediaCatalog {
    pub fn new(api: Arc<dyn CatalogApi>, config: &MediaCatConfig) -> Self {
        Self {
            uploads: UploadOrchestrator::new(Arc::clone(&api), config.ingest.clone()),
            listing: CatalogQuery::new(config.catalog),
            search: SearchDispatcher::new(config.search.clone()),
            history: HistoryRecorder::new(Arc::clone(&api)),
            api,
        }
    }

    /// Build the HTTP client described by `config.transport` and wire
    /// everything to it.
    pub fn connect(config: &MediaCatConfig) -> Result<Self, TransportError> {
        let api = HttpCatalogApi::new(config.transport.clone())?;
        tracing::debug!(root = %config.transport.api_root(), "catalog_client_ready");
        Ok(Self::new(Arc::new(api), config))
    }

    pub fn api(&self) -> &dyn CatalogApi {
        self.api.as_ref()
    }

    /// Refetch the current listing page.
    pub async fn refresh_listing(&mut self) -> Applied {
        self.listing.fetch_page(self.api.as_ref()).await
    }

    pub async fn goto_page(&mut self, page: u32) -> Applied {
        self.listing.change_page(self.api.as_ref(), page).await
    }

    pub async fn filter_listing(&mut self, filter: TypeFilter) -> Applied {
        self.listing.change_type_filter(self.api.as_ref(), filter).await
    }

    /// Run the search box's current input. `false` when there was nothing
    /// to search for.
    pub async fn run_search(&mut self) -> bool {
        self.search.search(self.api.as_ref()).await
    }

    /// Load one asset's detail, recording a view in the background.
    pub async fn open_asset(&self, id: &str) -> Result<AssetRef, TransportError> {
        open_asset(self.api.as_ref(), &self.history, id).await
    }

    /// [`open_asset`](Self::open_asset), keeping the view record's task.
    pub async fn open_asset_tracked(
        &self,
        id: &str,
    ) -> Result<(AssetRef, Option<JoinHandle<()>>), TransportError> {
        open_asset_tracked(self.api.as_ref(), &self.history, id).await
    }

    /// Fire-and-forget history record for a download or copy.
    pub fn record(&self, id: &str, action: HistoryAction) {
        let _ = self.history.record(id, action);
    }
}

impl fmt::Debug for MediaCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaCatalog")
            .field("uploads", &self.uploads.summary())
            .field("listing", self.listing.view())
            .field("search_mode", &self.search.mode())
            .finish_non_exhaustive()
    }
}
