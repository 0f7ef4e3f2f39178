//! Wire types exchanged with the catalog service.
//!
//! These mirror the JSON bodies of the `/api/v1` endpoints. The list endpoint
//! returns a reduced projection of an asset, so every [`AssetRef`] field other
//! than `id`, `name` and `type` is optional on the wire.
//!
//! ```text
//! AssetPage
//! ├── items: Vec<AssetRef>
//! ├── total / page / page_size
//! └── total_pages: Option<u32>   (derived from total/page_size when absent)
//!
//! SearchResponse (untagged)
//! ├── Ranked(Vec<SearchResult>)                  bare array
//! └── Envelope { results: Vec<FlatHit>, .. }     flat hits + totals
//! ```
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of media an asset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [MediaType::Image, MediaType::Video, MediaType::Audio];

    /// Wire name used by the `type` query parameter and asset bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog asset as seen by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub use_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_status: Option<String>,
    #[serde(
        default,
        with = "crate::serde_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl AssetRef {
    /// Minimal asset with only the identifying fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            media_type,
            description: None,
            file_size: None,
            mime_type: None,
            thumbnail_url: None,
            file_url: None,
            view_count: 0,
            use_count: 0,
            vector_status: None,
            created_at: None,
        }
    }
}

/// One page of the asset listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPage {
    pub items: Vec<AssetRef>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
}

impl AssetPage {
    /// Page count reported by the server, or derived from `total / page_size`
    /// when the server omitted it. Never below 1 so that an empty catalog
    /// still has a valid first page.
    pub fn resolved_total_pages(&self) -> u32 {
        let pages = match self.total_pages {
            Some(pages) => pages,
            None if self.page_size == 0 => 1,
            None => {
                let size = u64::from(self.page_size);
                u32::try_from(self.total.div_ceil(size)).unwrap_or(u32::MAX)
            }
        };
        pages.max(1)
    }
}

/// Query parameters for `GET /assets`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub page_size: u32,
    pub media_type: Option<MediaType>,
}

impl ListParams {
    pub(crate) fn to_query(self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(kind) = self.media_type {
            query.push(("type", kind.as_str().to_string()));
        }
        query
    }
}

/// Raw file content selected by the user. The bytes are shared, never copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl FilePayload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Lower-cased extension of the file name, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Body of `POST /assets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file: FilePayload,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<FilePayload> for UploadRequest {
    fn from(file: FilePayload) -> Self {
        Self {
            file,
            name: None,
            description: None,
        }
    }
}

/// Whether a hit matched the asset as a whole or one sampled frame of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    #[serde(alias = "image", alias = "whole")]
    Asset,
    #[serde(alias = "video_frame")]
    Frame,
    #[serde(other)]
    Unknown,
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub asset: AssetRef,
    pub score: f32,
    pub match_type: MatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
}

/// A hit as returned inside the envelope shape: asset fields inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatHit {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
}

/// Both response shapes the search endpoints are known to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Ranked(Vec<SearchResult>),
    Envelope {
        results: Vec<FlatHit>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query: Option<String>,
    },
}

/// Interaction kinds accepted by `POST /history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    View,
    Download,
    Copy,
    Use,
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HistoryAction::View => "view",
            HistoryAction::Download => "download",
            HistoryAction::Copy => "copy",
            HistoryAction::Use => "use",
        };
        f.write_str(name)
    }
}

/// Body of `POST /history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub asset_id: String,
    pub action_type: HistoryAction,
}

/// Counts returned by `GET /assets/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetStats {
    pub total: u64,
    pub images: u64,
    pub videos: u64,
    pub audios: u64,
}
