use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::config::TransportConfig;
use crate::retry::execute_with_retry;
use crate::types::{
    AssetPage, AssetRef, AssetStats, FilePayload, HistoryAction, HistoryRecord, ListParams,
    SearchResponse, UploadRequest,
};
use crate::{CatalogApi, TransportError};

/// [`CatalogApi`] over HTTP using a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpCatalogApi {
    client: Client,
    root: String,
    config: TransportConfig,
}

impl HttpCatalogApi {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|e| TransportError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            root: config.api_root(),
            config,
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.root, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn file_part(file: &FilePayload) -> Result<Part, TransportError> {
    let part = Part::stream_with_length(file.bytes.clone(), file.len() as u64)
        .file_name(file.file_name.clone());
    match file.content_type.as_deref() {
        Some(mime) => part
            .mime_str(mime)
            .map_err(|e| TransportError::InvalidConfig(format!("invalid content type `{mime}`: {e}"))),
        None => Ok(part),
    }
}

#[async_trait::async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list_assets(&self, params: ListParams) -> Result<AssetPage, TransportError> {
        let url = self.url("assets");
        let query = params.to_query();
        execute_with_retry(self.config.retry.as_ref(), |attempt| {
            if attempt > 0 {
                debug!(attempt, page = params.page, "list_assets_retry");
            }
            self.send_json(self.client.get(&url).query(&query))
        })
        .await
        .into_result()
    }

    async fn get_asset(&self, id: &str) -> Result<AssetRef, TransportError> {
        let url = self.url(&format!("assets/{id}"));
        execute_with_retry(self.config.retry.as_ref(), |_| {
            self.send_json(self.client.get(&url))
        })
        .await
        .into_result()
    }

    async fn upload_asset(&self, request: UploadRequest) -> Result<AssetRef, TransportError> {
        let mut form = Form::new().part("file", file_part(&request.file)?);
        if let Some(name) = request.name {
            form = form.text("name", name);
        }
        if let Some(description) = request.description {
            form = form.text("description", description);
        }
        self.send_json(self.client.post(self.url("assets")).multipart(form))
            .await
    }

    async fn delete_asset(&self, id: &str) -> Result<(), TransportError> {
        self.send(self.client.delete(self.url(&format!("assets/{id}"))))
            .await
            .map(|_| ())
    }

    async fn asset_stats(&self) -> Result<AssetStats, TransportError> {
        let url = self.url("assets/stats");
        execute_with_retry(self.config.retry.as_ref(), |_| {
            self.send_json(self.client.get(&url))
        })
        .await
        .into_result()
    }

    async fn search_text(&self, query: &str, limit: u32) -> Result<SearchResponse, TransportError> {
        let body = json!({ "query": query, "limit": limit });
        self.send_json(self.client.post(self.url("search/text")).json(&body))
            .await
    }

    async fn search_image(
        &self,
        image: &FilePayload,
        limit: Option<u32>,
    ) -> Result<SearchResponse, TransportError> {
        let mut form = Form::new().part("file", file_part(image)?);
        if let Some(limit) = limit {
            form = form.text("limit", limit.to_string());
        }
        self.send_json(self.client.post(self.url("search/image")).multipart(form))
            .await
    }

    async fn record_history(
        &self,
        asset_id: &str,
        action: HistoryAction,
    ) -> Result<(), TransportError> {
        let body = HistoryRecord {
            asset_id: asset_id.to_string(),
            action_type: action,
        };
        self.send(self.client.post(self.url("history")).json(&body))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_urls_under_api_root() {
        let api = HttpCatalogApi::new(TransportConfig {
            base_url: "http://catalog.local:8000/".into(),
            ..TransportConfig::default()
        })
        .unwrap();
        assert_eq!(api.url("assets"), "http://catalog.local:8000/api/v1/assets");
        assert_eq!(api.url("/search/text"), "http://catalog.local:8000/api/v1/search/text");
    }

    #[test]
    fn rejects_invalid_config() {
        let result = HttpCatalogApi::new(TransportConfig {
            base_url: String::new(),
            ..TransportConfig::default()
        });
        assert!(matches!(result, Err(TransportError::InvalidConfig(_))));
    }

    #[test]
    fn file_part_rejects_malformed_mime() {
        let file = FilePayload::new("a.jpg", vec![1, 2, 3]).with_content_type("not a mime");
        assert!(file_part(&file).is_err());
        let ok = FilePayload::new("a.jpg", vec![1, 2, 3]).with_content_type("image/jpeg");
        assert!(file_part(&ok).is_ok());
    }
}
