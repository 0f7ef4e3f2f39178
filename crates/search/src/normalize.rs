//! Converge both search response shapes on one ranked list.
use transport::{AssetRef, FlatHit, MatchType, MediaType, SearchResponse, SearchResult};

/// Flatten, sanitize and rank a search response.
///
/// Scores are forced into `[0, 1]` (NaN becomes 0). The sort is stable, so
/// hits with equal scores keep the order the server sent them in.
pub fn normalize(response: SearchResponse) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = match response {
        SearchResponse::Ranked(results) => results.into_iter().map(tidy).collect(),
        SearchResponse::Envelope { results, .. } => results.into_iter().map(from_flat).collect(),
    };
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results
}

fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        // `+ 0.0` folds -0.0 into 0.0 so it ties with zero under `total_cmp`.
        score.clamp(0.0, 1.0) + 0.0
    }
}

fn is_frame_hit(kind: MediaType, frame_index: Option<u32>, timestamp_ms: Option<u64>) -> bool {
    kind == MediaType::Video && (frame_index.is_some() || timestamp_ms.is_some())
}

fn tidy(mut result: SearchResult) -> SearchResult {
    result.score = clamp_score(result.score);
    if result.match_type == MatchType::Unknown {
        result.match_type = if is_frame_hit(result.asset.media_type, result.frame_index, result.timestamp_ms) {
            MatchType::Frame
        } else {
            MatchType::Asset
        };
    }
    result
}

fn from_flat(hit: FlatHit) -> SearchResult {
    let match_type = if is_frame_hit(hit.media_type, hit.frame_index, hit.timestamp_ms) {
        MatchType::Frame
    } else {
        MatchType::Asset
    };
    let mut asset = AssetRef::new(hit.id, hit.name, hit.media_type);
    asset.thumbnail_url = hit.thumbnail_url;
    SearchResult {
        asset,
        score: clamp_score(hit.score),
        match_type,
        frame_index: hit.frame_index,
        timestamp_ms: hit.timestamp_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, kind: MediaType, score: f32, frame: Option<u32>) -> FlatHit {
        FlatHit {
            id: id.into(),
            name: format!("{id}.bin"),
            media_type: kind,
            thumbnail_url: None,
            score,
            frame_index: frame,
            timestamp_ms: None,
        }
    }

    fn ids(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.asset.id.as_str()).collect()
    }

    #[test]
    fn ranks_descending_and_keeps_server_order_on_ties() {
        let response = SearchResponse::Envelope {
            results: vec![
                hit("a", MediaType::Image, 0.4, None),
                hit("b", MediaType::Image, 0.9, None),
                hit("c", MediaType::Audio, 0.4, None),
                hit("d", MediaType::Image, 0.4, None),
            ],
            total: Some(4),
            query: Some("harbor".into()),
        };
        assert_eq!(ids(&normalize(response)), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn scores_are_clamped() {
        let response = SearchResponse::Envelope {
            results: vec![
                hit("high", MediaType::Image, 1.7, None),
                hit("nan", MediaType::Image, f32::NAN, None),
                hit("neg", MediaType::Image, -0.2, None),
            ],
            total: None,
            query: None,
        };
        let results = normalize(response);
        assert_eq!(ids(&results), vec!["high", "nan", "neg"]);
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[1].score, 0.0);
        assert_eq!(results[2].score, 0.0);
    }

    #[test]
    fn signed_zero_scores_tie() {
        let response = SearchResponse::Envelope {
            results: vec![
                hit("first", MediaType::Image, -0.0, None),
                hit("second", MediaType::Image, 0.0, None),
            ],
            total: None,
            query: None,
        };
        let results = normalize(response);
        assert_eq!(ids(&results), vec!["first", "second"]);
        assert!(results.iter().all(|r| r.score.is_sign_positive()));
    }

    #[test]
    fn video_hits_with_frame_become_frame_matches() {
        let response = SearchResponse::Envelope {
            results: vec![
                hit("clip", MediaType::Video, 0.8, Some(12)),
                hit("whole", MediaType::Video, 0.7, None),
                hit("photo", MediaType::Image, 0.6, Some(3)),
            ],
            total: None,
            query: None,
        };
        let results = normalize(response);
        assert_eq!(results[0].match_type, MatchType::Frame);
        assert_eq!(results[0].frame_index, Some(12));
        assert_eq!(results[1].match_type, MatchType::Asset);
        assert_eq!(results[2].match_type, MatchType::Asset);
    }

    #[test]
    fn ranked_shape_is_sorted_too() {
        let low = SearchResult {
            asset: AssetRef::new("low", "low.mp3", MediaType::Audio),
            score: 0.1,
            match_type: MatchType::Unknown,
            frame_index: None,
            timestamp_ms: None,
        };
        let high = SearchResult {
            asset: AssetRef::new("high", "high.mp4", MediaType::Video),
            score: 0.95,
            match_type: MatchType::Unknown,
            frame_index: None,
            timestamp_ms: Some(4_000),
        };
        let results = normalize(SearchResponse::Ranked(vec![low, high]));
        assert_eq!(ids(&results), vec!["high", "low"]);
        assert_eq!(results[0].match_type, MatchType::Frame);
        assert_eq!(results[1].match_type, MatchType::Asset);
    }
}
