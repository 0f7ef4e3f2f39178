//! Page and filter state for the asset listing.
//!
//! Every request is stamped with a generation when it is issued. Completing a
//! request whose generation is no longer the latest is a no-op, so a slow
//! response for an abandoned page can never overwrite a newer one.
//!
//! ```text
//! set_page / set_type_filter / begin_fetch ──► PageRequest (gen N)
//!                                                  │ send(api)
//!                                                  ▼
//!                          complete(request, outcome) ──► Current | Stale | Clamped
//! ```
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use transport::{AssetPage, AssetRef, CatalogApi, ListParams, MediaType, TransportError};

use crate::config::{CatalogConfig, FilterPagePolicy};

/// Follow-up fetches allowed after the server shrank the page count under us.
const MAX_CLAMP_REFETCHES: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Image,
    Video,
    Audio,
}

impl TypeFilter {
    /// The `type` query value, `None` for no filtering.
    pub fn media_type(self) -> Option<MediaType> {
        match self {
            TypeFilter::All => None,
            TypeFilter::Image => Some(MediaType::Image),
            TypeFilter::Video => Some(MediaType::Video),
            TypeFilter::Audio => Some(MediaType::Audio),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::Image => "image",
            TypeFilter::Video => "video",
            TypeFilter::Audio => "audio",
        }
    }
}

impl From<MediaType> for TypeFilter {
    fn from(kind: MediaType) -> Self {
        match kind {
            MediaType::Image => TypeFilter::Image,
            MediaType::Video => TypeFilter::Video,
            MediaType::Audio => TypeFilter::Audio,
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeFilter {
    type Err = UnknownTypeFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(TypeFilter::All),
            "image" => Ok(TypeFilter::Image),
            "video" => Ok(TypeFilter::Video),
            "audio" => Ok(TypeFilter::Audio),
            _ => Err(UnknownTypeFilter(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown type filter `{0}` (expected all, image, video or audio)")]
pub struct UnknownTypeFilter(pub String);

/// Load state of the displayed page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last current request failed; items were cleared.
    Failed(String),
}

/// What the rendering layer shows. Items and pagination metadata always
/// come from the same response.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogView {
    pub items: Vec<AssetRef>,
    pub total: u64,
    pub total_pages: u32,
    pub page: u32,
    pub filter: TypeFilter,
    pub status: LoadStatus,
}

impl CatalogView {
    fn empty(filter: TypeFilter) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            total_pages: 1,
            page: 1,
            filter,
            status: LoadStatus::Idle,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One issued list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    generation: u64,
    params: ListParams,
    filter: TypeFilter,
}

impl PageRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn params(&self) -> ListParams {
        self.params
    }

    pub async fn send(&self, api: &dyn CatalogApi) -> Result<AssetPage, TransportError> {
        api.list_assets(self.params).await
    }
}

/// How a completed request was reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The response (or failure) is now displayed.
    Current,
    /// A newer request was issued meanwhile; the outcome was discarded.
    Stale,
    /// The requested page is past the server's page count. The page was
    /// moved to `page` and that page still has to be fetched. The async
    /// drivers never return this; they refetch or settle as `Failed`.
    Clamped { page: u32 },
}

/// Owns `{page, page_size, filter}` and reconciles list responses into a
/// [`CatalogView`].
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    config: CatalogConfig,
    page: u32,
    filter: TypeFilter,
    generation: u64,
    view: CatalogView,
}

impl CatalogQuery {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            page: 1,
            filter: TypeFilter::All,
            generation: 0,
            view: CatalogView::empty(TypeFilter::All),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }

    pub fn filter(&self) -> TypeFilter {
        self.filter
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    /// Store a new page and issue the request for it.
    ///
    /// The page is not checked against the known page count; the server
    /// response decides. Page 0 is treated as 1.
    pub fn set_page(&mut self, page: u32) -> PageRequest {
        self.page = page.max(1);
        self.begin_fetch()
    }

    /// Store a new filter and issue the request for it.
    ///
    /// The previous result set is dropped immediately. The page follows the
    /// configured [`FilterPagePolicy`].
    pub fn set_type_filter(&mut self, filter: TypeFilter) -> PageRequest {
        if filter != self.filter {
            self.filter = filter;
            if self.config.filter_policy == FilterPagePolicy::ResetToFirst {
                self.page = 1;
            }
            self.view = CatalogView {
                page: self.page,
                ..CatalogView::empty(filter)
            };
        }
        self.begin_fetch()
    }

    /// Issue a request for the current page and filter. Any request issued
    /// earlier becomes stale.
    pub fn begin_fetch(&mut self) -> PageRequest {
        self.generation += 1;
        self.view.status = LoadStatus::Loading;
        let request = PageRequest {
            generation: self.generation,
            params: ListParams {
                page: self.page,
                page_size: self.config.page_size,
                media_type: self.filter.media_type(),
            },
            filter: self.filter,
        };
        debug!(
            generation = request.generation,
            page = self.page,
            filter = %self.filter,
            "catalog_page_requested"
        );
        request
    }

    /// Reconcile the outcome of `request` into the view.
    pub fn complete(
        &mut self,
        request: &PageRequest,
        outcome: Result<AssetPage, TransportError>,
    ) -> Applied {
        if request.generation != self.generation {
            debug!(
                generation = request.generation,
                latest = self.generation,
                "catalog_page_stale"
            );
            return Applied::Stale;
        }

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                warn!(page = request.params.page, error = %err, "catalog_page_failed");
                self.view = CatalogView {
                    page: self.page,
                    status: LoadStatus::Failed(err.to_string()),
                    ..CatalogView::empty(request.filter)
                };
                return Applied::Current;
            }
        };

        let total_pages = response.resolved_total_pages();
        // The server may answer with a different page than asked for.
        let page = if response.page == 0 {
            request.params.page
        } else {
            response.page
        };

        if page > total_pages {
            info!(page, total_pages, "catalog_page_clamped");
            self.page = total_pages;
            self.view = CatalogView {
                total: response.total,
                total_pages,
                page: total_pages,
                status: LoadStatus::Loading,
                ..CatalogView::empty(request.filter)
            };
            return Applied::Clamped { page: total_pages };
        }

        self.page = page;
        self.view = CatalogView {
            items: response.items,
            total: response.total,
            total_pages,
            page,
            filter: request.filter,
            status: LoadStatus::Ready,
        };
        Applied::Current
    }

    /// Fetch the current page and apply it, following up when the server
    /// clamps the page.
    pub async fn fetch_page(&mut self, api: &dyn CatalogApi) -> Applied {
        let request = self.begin_fetch();
        self.drive(api, request).await
    }

    /// [`set_page`](Self::set_page), then fetch.
    pub async fn change_page(&mut self, api: &dyn CatalogApi, page: u32) -> Applied {
        let request = self.set_page(page);
        self.drive(api, request).await
    }

    /// [`set_type_filter`](Self::set_type_filter), then fetch.
    pub async fn change_type_filter(&mut self, api: &dyn CatalogApi, filter: TypeFilter) -> Applied {
        let request = self.set_type_filter(filter);
        self.drive(api, request).await
    }

    async fn drive(&mut self, api: &dyn CatalogApi, mut request: PageRequest) -> Applied {
        let mut refetches = 0;
        loop {
            let outcome = request.send(api).await;
            let applied = self.complete(&request, outcome);
            match applied {
                Applied::Clamped { .. } if refetches < MAX_CLAMP_REFETCHES => {
                    refetches += 1;
                    request = self.begin_fetch();
                }
                Applied::Clamped { page } => return self.give_up_clamping(page),
                _ => return applied,
            }
        }
    }

    /// The page count kept moving under every refetch. Stop with an empty,
    /// failed view on the last clamped page instead of staying `Loading`.
    fn give_up_clamping(&mut self, page: u32) -> Applied {
        warn!(
            page,
            total_pages = self.view.total_pages,
            refetches = MAX_CLAMP_REFETCHES,
            "catalog_page_unsettled"
        );
        self.view.status = LoadStatus::Failed(format!(
            "page count kept shrinking; stopped at page {page} of {}",
            self.view.total_pages
        ));
        Applied::Current
    }
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}
