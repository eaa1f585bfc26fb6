// file: src/client/trieve.rs
// description: HTTP client for the hosted search service (chunks, groups, events)
// reference: https://docs.trieve.ai/api-reference

use crate::config::Credentials;
use crate::error::{DemoError, Result};
use crate::models::{
    CreateChunkGroupRequest, CreateChunkRequest, EventsRequest, RecommendChunksRequest,
    RecommendGroupsRequest, SearchRequest,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const DATASET_HEADER: &str = "TR-Dataset";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    CreateChunk,
    SearchChunks,
    RecommendChunks,
    DeleteChunkByTrackingId(String),
    CreateChunkGroup,
    GroupOrientedSearch,
    RecommendGroups,
    Events,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::DeleteChunkByTrackingId(_) => Method::DELETE,
            _ => Method::POST,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::CreateChunk => "/chunk".to_string(),
            Endpoint::SearchChunks => "/chunk/search".to_string(),
            Endpoint::RecommendChunks => "/chunk/recommend".to_string(),
            Endpoint::DeleteChunkByTrackingId(id) => format!("/chunk/tracking_id/{}", id),
            Endpoint::CreateChunkGroup => "/chunk_group".to_string(),
            Endpoint::GroupOrientedSearch => "/chunk_group/group_oriented_search".to_string(),
            Endpoint::RecommendGroups => "/chunk_group/recommend".to_string(),
            Endpoint::Events => "/events".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct TrieveClient {
    client: Client,
    base_url: String,
    api_key: HeaderValue,
    dataset_id: HeaderValue,
}

impl TrieveClient {
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let mut api_key = HeaderValue::from_str(&credentials.api_key)
            .map_err(|e| DemoError::Config(format!("api_key is not a valid header: {}", e)))?;
        api_key.set_sensitive(true);

        let dataset_id = HeaderValue::from_str(&credentials.dataset_id)
            .map_err(|e| DemoError::Config(format!("dataset_id is not a valid header: {}", e)))?;

        let client = Client::builder().timeout(credentials.timeout).build()?;

        Ok(Self {
            client,
            base_url: credentials.base_url.clone(),
            api_key,
            dataset_id,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request for `endpoint` carrying the auth and dataset headers.
    pub fn request(&self, endpoint: &Endpoint) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint.path());

        self.client
            .request(endpoint.method(), url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(AUTHORIZATION, self.api_key.clone())
            .header(DATASET_HEADER, self.dataset_id.clone())
    }

    pub async fn create_chunk(&self, body: &CreateChunkRequest) -> Result<Value> {
        self.post_json(&Endpoint::CreateChunk, body).await
    }

    pub async fn search_chunks(&self, body: &SearchRequest) -> Result<Value> {
        self.post_json(&Endpoint::SearchChunks, body).await
    }

    pub async fn recommend_chunks(&self, body: &RecommendChunksRequest) -> Result<Value> {
        self.post_json(&Endpoint::RecommendChunks, body).await
    }

    pub async fn delete_chunk_by_tracking_id(&self, tracking_id: &str) -> Result<Value> {
        let endpoint = Endpoint::DeleteChunkByTrackingId(tracking_id.to_string());
        self.send(&endpoint, self.request(&endpoint)).await
    }

    pub async fn create_chunk_group(&self, body: &CreateChunkGroupRequest) -> Result<Value> {
        self.post_json(&Endpoint::CreateChunkGroup, body).await
    }

    pub async fn group_oriented_search(&self, body: &SearchRequest) -> Result<Value> {
        self.post_json(&Endpoint::GroupOrientedSearch, body).await
    }

    pub async fn recommend_groups(&self, body: &RecommendGroupsRequest) -> Result<Value> {
        self.post_json(&Endpoint::RecommendGroups, body).await
    }

    pub async fn get_events(&self, page: u32) -> Result<Value> {
        self.post_json(&Endpoint::Events, &EventsRequest { page }).await
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &Endpoint,
        body: &T,
    ) -> Result<Value> {
        self.send(endpoint, self.request(endpoint).json(body)).await
    }

    async fn send(&self, endpoint: &Endpoint, request: RequestBuilder) -> Result<Value> {
        debug!("{} {}", endpoint.method(), endpoint.path());

        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DemoError::Api {
                status: status.as_u16(),
                body: if body.is_empty() {
                    "Unknown error".to_string()
                } else {
                    body
                },
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn test_client() -> TrieveClient {
        TrieveClient::new(&Credentials {
            base_url: "https://search.example.test/api".to_string(),
            api_key: "tr-secret".to_string(),
            dataset_id: "dataset-42".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_routes() {
        assert_eq!(Endpoint::CreateChunk.path(), "/chunk");
        assert_eq!(
            Endpoint::DeleteChunkByTrackingId("1".to_string()).path(),
            "/chunk/tracking_id/1"
        );
        assert_eq!(
            Endpoint::GroupOrientedSearch.path(),
            "/chunk_group/group_oriented_search"
        );
        assert_eq!(
            Endpoint::DeleteChunkByTrackingId("0".to_string()).method(),
            Method::DELETE
        );
        assert_eq!(Endpoint::RecommendGroups.method(), Method::POST);
    }

    #[test]
    fn test_request_carries_auth_headers() {
        let client = test_client();
        let request = client.request(&Endpoint::SearchChunks).build().unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://search.example.test/api/chunk/search"
        );
        assert_eq!(request.headers()[AUTHORIZATION], "tr-secret");
        assert!(request.headers()[AUTHORIZATION].is_sensitive());
        assert_eq!(request.headers()[DATASET_HEADER], "dataset-42");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_delete_request_has_no_body() {
        let client = test_client();
        let request = client
            .request(&Endpoint::DeleteChunkByTrackingId("0".to_string()))
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(
            request.url().as_str(),
            "https://search.example.test/api/chunk/tracking_id/0"
        );
        assert!(request.body().is_none());
    }

    #[test]
    fn test_search_request_body() {
        let client = test_client();
        let body = SearchRequest::from_config(&Config::default_config().search);
        let request = client
            .request(&Endpoint::GroupOrientedSearch)
            .json(&body)
            .build()
            .unwrap();

        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        let sent: Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(sent["query"], json!("border"));
        assert_eq!(sent["filters"]["must"][0]["field"], json!("metadata.states"));
    }

    #[test]
    fn test_invalid_header_value_rejected() {
        let result = TrieveClient::new(&Credentials {
            base_url: "https://search.example.test/api".to_string(),
            api_key: "bad\nkey".to_string(),
            dataset_id: "ds".to_string(),
            timeout: Duration::from_secs(5),
        });
        assert!(matches!(result, Err(DemoError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_http_error() {
        let client = TrieveClient::new(&Credentials {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "tr-secret".to_string(),
            dataset_id: "ds".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();

        let err = client.get_events(1).await.unwrap_err();
        assert!(matches!(err, DemoError::Http(_)));
    }
}
