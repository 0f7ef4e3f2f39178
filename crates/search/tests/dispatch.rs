use std::sync::Mutex;

use async_trait::async_trait;
use search::{SearchConfig, SearchDispatcher, SearchMode};
use transport::{
    AssetPage, AssetRef, AssetStats, CatalogApi, FilePayload, FlatHit, HistoryAction, ListParams,
    MatchType, MediaType, SearchResponse, SearchResult, TransportError, UploadRequest,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Text(String, u32),
    Image(String, Option<u32>),
}

/// Text searches answer in the envelope shape, image searches as a bare
/// ranked array, like the two service versions in the wild.
#[derive(Default)]
struct FakeSearch {
    calls: Mutex<Vec<Call>>,
    fail: bool,
}

impl FakeSearch {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

fn unused() -> TransportError {
    TransportError::Request("not used in these tests".into())
}

#[async_trait]
impl CatalogApi for FakeSearch {
    async fn list_assets(&self, _: ListParams) -> Result<AssetPage, TransportError> {
        Err(unused())
    }
    async fn get_asset(&self, _: &str) -> Result<AssetRef, TransportError> {
        Err(unused())
    }
    async fn upload_asset(&self, _: UploadRequest) -> Result<AssetRef, TransportError> {
        Err(unused())
    }
    async fn delete_asset(&self, _: &str) -> Result<(), TransportError> {
        Err(unused())
    }
    async fn asset_stats(&self) -> Result<AssetStats, TransportError> {
        Err(unused())
    }
    async fn search_text(&self, query: &str, limit: u32) -> Result<SearchResponse, TransportError> {
        self.calls.lock().unwrap().push(Call::Text(query.to_string(), limit));
        if self.fail {
            return Err(TransportError::Status {
                status: 503,
                body: "embedding model loading".into(),
            });
        }
        let hit = |id: &str, media_type, score, frame_index| FlatHit {
            id: id.to_string(),
            name: format!("{id} file"),
            media_type,
            thumbnail_url: Some(format!("/thumbs/{id}.jpg")),
            score,
            frame_index,
            timestamp_ms: None,
        };
        Ok(SearchResponse::Envelope {
            results: vec![
                hit("still", MediaType::Image, 0.61, None),
                hit("reel", MediaType::Video, 0.87, Some(42)),
                hit("twin", MediaType::Image, 0.61, None),
            ],
            total: Some(3),
            query: Some(query.to_string()),
        })
    }
    async fn search_image(
        &self,
        image: &FilePayload,
        limit: Option<u32>,
    ) -> Result<SearchResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Image(image.file_name.clone(), limit));
        Ok(SearchResponse::Ranked(vec![SearchResult {
            asset: AssetRef::new("look-alike", "look-alike.png", MediaType::Image),
            score: 0.93,
            match_type: MatchType::Asset,
            frame_index: None,
            timestamp_ms: None,
        }]))
    }
    async fn record_history(&self, _: &str, _: HistoryAction) -> Result<(), TransportError> {
        Err(unused())
    }
}

#[tokio::test]
async fn text_search_ranks_normalized_envelope() {
    let api = FakeSearch::default();
    let mut search = SearchDispatcher::new(SearchConfig {
        limit: 5,
        ..SearchConfig::default()
    });
    search.set_text("  red boat ");

    assert!(search.search(&api).await);

    assert_eq!(api.calls(), vec![Call::Text("red boat".into(), 5)]);
    let results = search.results();
    let ids: Vec<&str> = results.iter().map(|r| r.asset.id.as_str()).collect();
    assert_eq!(ids, vec!["reel", "still", "twin"]);
    assert_eq!(results[0].match_type, MatchType::Frame);
    assert_eq!(results[0].frame_index, Some(42));
    assert_eq!(results[1].asset.thumbnail_url.as_deref(), Some("/thumbs/still.jpg"));
    assert!(search.attempted());
    assert!(!search.is_loading());
}

#[tokio::test]
async fn image_search_uses_the_selected_file() {
    let api = FakeSearch::default();
    let mut search = SearchDispatcher::default();
    search.set_mode(SearchMode::Image);
    search
        .select_image(FilePayload::new("probe.webp", vec![7; 16]))
        .unwrap();

    assert!(search.search(&api).await);

    assert_eq!(api.calls(), vec![Call::Image("probe.webp".into(), Some(20))]);
    assert_eq!(search.results()[0].asset.id, "look-alike");
}

#[tokio::test]
async fn missing_input_issues_no_request() {
    let api = FakeSearch::default();
    let mut search = SearchDispatcher::default();

    search.set_text("   ");
    assert!(!search.search(&api).await);
    search.set_mode(SearchMode::Image);
    assert!(!search.search(&api).await);

    assert!(api.calls().is_empty());
    assert!(!search.attempted());
    assert!(!search.is_loading());
}

#[tokio::test]
async fn switching_mode_empties_results_before_next_search() {
    let api = FakeSearch::default();
    let mut search = SearchDispatcher::default();
    search.set_text("harbor");
    search.search(&api).await;
    assert_eq!(search.results().len(), 3);

    search.set_mode(SearchMode::Image);

    assert!(search.results().is_empty());
    assert!(search.text().is_empty());
    assert!(!search.attempted());
}

#[tokio::test]
async fn failed_search_replaces_previous_results() {
    let mut api = FakeSearch::default();
    let mut search = SearchDispatcher::default();
    search.set_text("harbor");
    search.search(&api).await;
    assert!(!search.results().is_empty());

    api.fail = true;
    assert!(search.search(&api).await);

    assert!(search.results().is_empty());
    assert!(search.attempted());
    assert!(search.last_error().unwrap().contains("503"));
}
