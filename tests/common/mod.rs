//! Scripted in-memory catalog service shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mediacat::{
    AssetPage, AssetRef, AssetStats, CatalogApi, FilePayload, HistoryAction,
    MediaCatConfig, MediaCatalog, MediaType, SearchResponse, TransportError,
};
use transport::{FlatHit, ListParams, UploadRequest};

/// Behaves like the catalog service: paginates by `page_size`, echoes the
/// requested page even past the end, and omits `total_pages`.
#[derive(Default)]
pub struct ScriptedApi {
    assets: Mutex<Vec<AssetRef>>,
    failing_uploads: Mutex<Vec<String>>,
    list_delays: Mutex<HashMap<u32, Duration>>,
    list_fails: Mutex<bool>,
    search_fails: Mutex<bool>,
    text_hits: Mutex<Vec<FlatHit>>,
    pub log: Mutex<Vec<String>>,
    pub history: Mutex<Vec<(String, HistoryAction)>>,
    uploads_in_flight: AtomicUsize,
    pub max_uploads_in_flight: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_assets(images: usize, videos: usize, audios: usize) -> Arc<Self> {
        let api = Self::default();
        {
            let mut assets = api.assets.lock().unwrap();
            for (kind, count) in [
                (MediaType::Image, images),
                (MediaType::Video, videos),
                (MediaType::Audio, audios),
            ] {
                for i in 0..count {
                    assets.push(AssetRef::new(
                        format!("{kind}-{i}"),
                        format!("{kind} {i}"),
                        kind,
                    ));
                }
            }
        }
        Arc::new(api)
    }

    pub fn fail_upload_of(&self, file_name: &str) {
        self.failing_uploads.lock().unwrap().push(file_name.to_string());
    }

    pub fn delay_page(&self, page: u32, delay: Duration) {
        self.list_delays.lock().unwrap().insert(page, delay);
    }

    pub fn fail_listing(&self, fail: bool) {
        *self.list_fails.lock().unwrap() = fail;
    }

    pub fn fail_searches(&self, fail: bool) {
        *self.search_fails.lock().unwrap() = fail;
    }

    pub fn set_text_hits(&self, hits: Vec<FlatHit>) {
        *self.text_hits.lock().unwrap() = hits;
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn note(&self, line: String) {
        self.log.lock().unwrap().push(line);
    }
}

pub fn flat_hit(id: &str, media_type: MediaType, score: f32) -> FlatHit {
    FlatHit {
        id: id.to_string(),
        name: format!("{id}.bin"),
        media_type,
        thumbnail_url: None,
        score,
        frame_index: None,
        timestamp_ms: None,
    }
}

pub fn app(api: Arc<ScriptedApi>) -> MediaCatalog {
    app_with(api, MediaCatConfig::default())
}

pub fn app_with(api: Arc<ScriptedApi>, config: MediaCatConfig) -> MediaCatalog {
    MediaCatalog::new(api, &config)
}

pub fn file(name: &str) -> FilePayload {
    FilePayload::new(name, name.as_bytes().to_vec())
}

#[async_trait]
impl CatalogApi for ScriptedApi {
    async fn list_assets(&self, params: ListParams) -> Result<AssetPage, TransportError> {
        self.note(format!("list page={}", params.page));
        let delay = self.list_delays.lock().unwrap().get(&params.page).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.list_fails.lock().unwrap() {
            return Err(TransportError::Status {
                status: 500,
                body: "database unavailable".into(),
            });
        }
        let matching: Vec<AssetRef> = self
            .assets
            .lock()
            .unwrap()
            .iter()
            .filter(|a| params.media_type.is_none_or(|kind| a.media_type == kind))
            .cloned()
            .collect();
        let start = (params.page.saturating_sub(1) * params.page_size) as usize;
        Ok(AssetPage {
            total: matching.len() as u64,
            items: matching
                .into_iter()
                .skip(start)
                .take(params.page_size as usize)
                .collect(),
            page: params.page,
            page_size: params.page_size,
            total_pages: None,
        })
    }

    async fn get_asset(&self, id: &str) -> Result<AssetRef, TransportError> {
        self.assets
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(TransportError::Status {
                status: 404,
                body: "asset not found".into(),
            })
    }

    async fn upload_asset(&self, request: UploadRequest) -> Result<AssetRef, TransportError> {
        let name = request.file.file_name.clone();
        let now = self.uploads_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_uploads_in_flight.fetch_max(now, Ordering::SeqCst);
        self.note(format!("upload start {name}"));
        tokio::time::sleep(Duration::from_millis(3)).await;
        self.note(format!("upload end {name}"));
        self.uploads_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_uploads.lock().unwrap().contains(&name) {
            return Err(TransportError::Status {
                status: 415,
                body: format!("cannot decode {name}"),
            });
        }
        let asset = AssetRef::new(format!("srv-{name}"), name, MediaType::Image);
        self.assets.lock().unwrap().push(asset.clone());
        Ok(asset)
    }

    async fn delete_asset(&self, id: &str) -> Result<(), TransportError> {
        self.assets.lock().unwrap().retain(|a| a.id != id);
        Ok(())
    }

    async fn asset_stats(&self) -> Result<AssetStats, TransportError> {
        let assets = self.assets.lock().unwrap();
        let count = |kind| assets.iter().filter(|a| a.media_type == kind).count() as u64;
        Ok(AssetStats {
            total: assets.len() as u64,
            images: count(MediaType::Image),
            videos: count(MediaType::Video),
            audios: count(MediaType::Audio),
        })
    }

    async fn search_text(&self, query: &str, limit: u32) -> Result<SearchResponse, TransportError> {
        self.note(format!("search text {query} limit={limit}"));
        if *self.search_fails.lock().unwrap() {
            return Err(TransportError::Timeout("search backend".into()));
        }
        Ok(SearchResponse::Envelope {
            results: self.text_hits.lock().unwrap().clone(),
            total: None,
            query: Some(query.to_string()),
        })
    }

    async fn search_image(
        &self,
        image: &FilePayload,
        limit: Option<u32>,
    ) -> Result<SearchResponse, TransportError> {
        self.note(format!("search image {} limit={limit:?}", image.file_name));
        if *self.search_fails.lock().unwrap() {
            return Err(TransportError::Timeout("search backend".into()));
        }
        Ok(SearchResponse::Ranked(Vec::new()))
    }

    async fn record_history(&self, asset_id: &str, action: HistoryAction) -> Result<(), TransportError> {
        self.history
            .lock()
            .unwrap()
            .push((asset_id.to_string(), action));
        Err(TransportError::Status {
            status: 503,
            body: "history disabled".into(),
        })
    }
}
