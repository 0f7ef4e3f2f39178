//! Semantic search dispatch
//!
//! A [`SearchDispatcher`] runs exactly one of two mutually exclusive modes:
//!
//! | Mode | Input | Endpoint |
//! |------|-------|----------|
//! | [`SearchMode::Text`] | non-blank query, trimmed | `POST /search/text` |
//! | [`SearchMode::Image`] | one jpg/jpeg/png/webp file | `POST /search/image` |
//!
//! Both endpoints converge on one ranked `Vec<SearchResult>` through
//! [`normalize`]: the bare-array and envelope response shapes are unified,
//! scores are forced into `[0, 1]`, and hits are ordered by descending score
//! with server order kept on ties.
//!
//! A search whose input is missing is a no-op. A failed search shows an
//! empty list and still counts as attempted. Overlapping searches resolve
//! last-request-wins, and switching modes abandons whatever is in flight.
//!
//! ```no_run
//! use search::{SearchConfig, SearchDispatcher};
//! use transport::{HttpCatalogApi, TransportConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpCatalogApi::new(TransportConfig::default())?;
//! let mut search = SearchDispatcher::new(SearchConfig::default());
//! search.set_text("foggy harbor at dawn");
//! if search.search(&api).await {
//!     for hit in search.results() {
//!         println!("{:.3} {}", hit.score, hit.asset.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatcher;
mod normalize;

pub use crate::config::{SearchConfig, SearchConfigError, DEFAULT_LIMIT, MAX_LIMIT};
pub use crate::dispatcher::{SearchDispatcher, SearchError, SearchMode, SearchQuery, SearchTicket};
pub use crate::normalize::normalize;
