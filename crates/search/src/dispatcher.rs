use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use transport::{CatalogApi, FilePayload, SearchResponse, SearchResult, TransportError};

use crate::config::SearchConfig;
use crate::normalize::normalize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Text,
    Image,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchMode::Text => "text",
            SearchMode::Image => "image",
        })
    }
}

/// Validated input for exactly one search mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Trimmed, non-empty.
    Text(String),
    Image(FilePayload),
}

impl SearchQuery {
    pub fn mode(&self) -> SearchMode {
        match self {
            SearchQuery::Text(_) => SearchMode::Text,
            SearchQuery::Image(_) => SearchMode::Image,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SearchError {
    #[error("`{0}` has no file extension")]
    MissingExtension(String),

    #[error("`{file_name}` is not a searchable image (extension `{extension}`)")]
    UnsupportedImage {
        file_name: String,
        extension: String,
    },

    #[error("`{0}` is empty")]
    EmptyImage(String),
}

/// One issued search.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    generation: u64,
    query: SearchQuery,
    limit: u32,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Dispatch to the endpoint matching the query's mode.
    pub async fn execute(&self, api: &dyn CatalogApi) -> Result<SearchResponse, TransportError> {
        match &self.query {
            SearchQuery::Text(text) => api.search_text(text, self.limit).await,
            SearchQuery::Image(image) => api.search_image(image, Some(self.limit)).await,
        }
    }
}

/// Owns search-mode state and the current ranked results.
///
/// `loading` and `attempted` are tracked separately so that a "no results"
/// message can be shown only after a search actually ran.
#[derive(Debug, Clone)]
pub struct SearchDispatcher {
    config: SearchConfig,
    mode: SearchMode,
    text: String,
    image: Option<FilePayload>,
    results: Vec<SearchResult>,
    loading: bool,
    attempted: bool,
    last_error: Option<String>,
    generation: u64,
}

impl SearchDispatcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            mode: SearchMode::default(),
            text: String::new(),
            image: None,
            results: Vec::new(),
            loading: false,
            attempted: false,
            last_error: None,
            generation: 0,
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&FilePayload> {
        self.image.as_ref()
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn attempted(&self) -> bool {
        self.attempted
    }

    /// Error detail of the last applied search, if it failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Switch modes, discarding results and the input of both modes.
    ///
    /// Any search still in flight becomes stale. Selecting the active mode
    /// again changes nothing.
    pub fn set_mode(&mut self, mode: SearchMode) {
        if mode == self.mode {
            return;
        }
        debug!(from = %self.mode, to = %mode, "search_mode_changed");
        self.mode = mode;
        self.generation += 1;
        self.text.clear();
        self.image = None;
        self.results.clear();
        self.loading = false;
        self.attempted = false;
        self.last_error = None;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Store the image to search by. A file that is not an accepted image
    /// is refused and the previous selection kept.
    pub fn select_image(&mut self, image: FilePayload) -> Result<(), SearchError> {
        let extension = image
            .extension()
            .ok_or_else(|| SearchError::MissingExtension(image.file_name.clone()))?;
        if !self.config.accepts_image_extension(&extension) {
            return Err(SearchError::UnsupportedImage {
                file_name: image.file_name.clone(),
                extension,
            });
        }
        if image.is_empty() {
            return Err(SearchError::EmptyImage(image.file_name.clone()));
        }
        self.image = Some(image);
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    /// The query the active mode would send, or `None` when its input is
    /// missing.
    pub fn pending_query(&self) -> Option<SearchQuery> {
        match self.mode {
            SearchMode::Text => {
                let text = self.text.trim();
                (!text.is_empty()).then(|| SearchQuery::Text(text.to_string()))
            }
            SearchMode::Image => self.image.clone().map(SearchQuery::Image),
        }
    }

    /// Issue a search for the active mode.
    ///
    /// Returns `None` without touching any state when the mode's input is
    /// missing. Otherwise marks loading and supersedes earlier tickets.
    pub fn begin_search(&mut self) -> Option<SearchTicket> {
        let query = self.pending_query()?;
        self.generation += 1;
        self.loading = true;
        debug!(generation = self.generation, mode = %query.mode(), "search_started");
        Some(SearchTicket {
            generation: self.generation,
            query,
            limit: self.config.effective_limit(),
        })
    }

    /// Apply the outcome of `ticket`. Returns `false` if the ticket was
    /// superseded and the outcome discarded.
    ///
    /// A failure replaces the results with an empty list.
    pub fn complete(
        &mut self,
        ticket: &SearchTicket,
        outcome: Result<SearchResponse, TransportError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                "search_result_stale"
            );
            return false;
        }
        self.loading = false;
        self.attempted = true;
        match outcome {
            Ok(response) => {
                self.results = normalize(response);
                self.last_error = None;
                info!(mode = %ticket.query.mode(), hits = self.results.len(), "search_completed");
            }
            Err(err) => {
                warn!(mode = %ticket.query.mode(), error = %err, "search_failed");
                self.results.clear();
                self.last_error = Some(err.to_string());
            }
        }
        true
    }

    /// Run a search end to end. Returns `false` when nothing was issued.
    pub async fn search(&mut self, api: &dyn CatalogApi) -> bool {
        let Some(ticket) = self.begin_search() else {
            return false;
        };
        let outcome = ticket.execute(api).await;
        self.complete(&ticket, outcome)
    }
}

impl Default for SearchDispatcher {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}
