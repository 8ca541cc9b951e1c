//! CareerOneStop occupation search, the primary provider.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::occupations::{
    build_http_client, fetch_json, OccupationProvider, OccupationResult, ProviderError,
};

/// "N" restricts the listing to occupation-level records.
const DATA_LEVEL: &str = "N";
const START_OFFSET: &str = "0";

const CODE_FIELD: &str = "OnetCode";
const TITLE_FIELD: &str = "OnetTitle";

/// Entries stay raw so one bad record cannot fail the whole body.
#[derive(Debug, Deserialize)]
struct OccupationListResponse {
    #[serde(rename = "OccupationList", default)]
    occupation_list: Option<Vec<Value>>,
}

#[derive(Clone)]
pub struct CareerOneStopClient {
    client: Client,
    endpoint: String,
    user_id: String,
    token: String,
    timeout: Duration,
}

impl CareerOneStopClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: build_http_client().context("Failed to build CareerOneStop HTTP client")?,
            endpoint: config.career_one_stop_endpoint.clone(),
            user_id: config.career_one_stop_user_id.clone(),
            token: config.career_one_stop_token.clone(),
            timeout: config.provider_timeout,
        })
    }

    /// `{endpoint}/{userId}/{keyword}/{dataLevel}/{start}/{limit}`, each segment percent-encoded.
    fn occupation_url(&self, keyword: &str, n_results: u32) -> Result<Url, ProviderError> {
        // The URL parser drops "." and ".." segments, which would shift the template.
        if keyword == "." || keyword == ".." {
            return Err(ProviderError::UnroutableKeyword(keyword.to_string()));
        }
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| ProviderError::InvalidEndpoint(format!("{}: {e}", self.endpoint)))?;
        let limit = n_results.to_string();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ProviderError::InvalidEndpoint(self.endpoint.clone()))?;
            segments.pop_if_empty().extend([
                self.user_id.as_str(),
                keyword,
                DATA_LEVEL,
                START_OFFSET,
                limit.as_str(),
            ]);
        }
        Ok(url)
    }

    async fn try_search(
        &self,
        keyword: &str,
        n_results: u32,
    ) -> Result<Vec<OccupationResult>, ProviderError> {
        let url = self.occupation_url(keyword, n_results)?;
        let request = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .query(&[("datasettype", "onet"), ("searchby", "title")])
            .timeout(self.timeout);

        let body: OccupationListResponse = fetch_json(request).await?;
        Ok(normalize(body))
    }
}

/// Keeps complete records in upstream order. The limit was already applied upstream.
fn normalize(body: OccupationListResponse) -> Vec<OccupationResult> {
    body.occupation_list
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| OccupationResult::from_entry(&entry, CODE_FIELD, TITLE_FIELD))
        .collect()
}

#[async_trait]
impl OccupationProvider for CareerOneStopClient {
    fn name(&self) -> &'static str {
        "CareerOneStop"
    }

    async fn search(&self, keyword: &str, n_results: u32) -> Vec<OccupationResult> {
        info!("Searching CareerOneStop API for keyword: '{keyword}'");

        match self.try_search(keyword, n_results).await {
            Ok(results) => {
                info!("CareerOneStop API returned {} results", results.len());
                results
            }
            Err(e) => {
                warn!("CareerOneStop API request failed: {e}");
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query, State},
        http::{HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};

    use super::*;
    use crate::config::{test_config, DEFAULT_ONET_API_URL};
    use crate::occupations::test_support::{occupation, spawn_stub};

    #[derive(Debug, Default, Clone)]
    struct Captured {
        segments: Vec<String>,
        query: HashMap<String, String>,
        authorization: Option<String>,
        accept: Option<String>,
    }

    #[derive(Clone)]
    struct StubState {
        capture: Arc<Mutex<Option<Captured>>>,
        payload: Value,
    }

    async fn occupation_list(
        State(state): State<StubState>,
        Path(segments): Path<(String, String, String, String, String)>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Json<Value> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        *state.capture.lock().unwrap() = Some(Captured {
            segments: vec![segments.0, segments.1, segments.2, segments.3, segments.4],
            query,
            authorization: header("authorization"),
            accept: header("accept"),
        });
        Json(state.payload)
    }

    async fn stub_client(
        payload: Value,
    ) -> (CareerOneStopClient, Arc<Mutex<Option<Captured>>>) {
        let capture = Arc::new(Mutex::new(None));
        let router = Router::new()
            .route(
                "/v1/occupation/:user_id/:keyword/:level/:start/:limit",
                get(occupation_list),
            )
            .with_state(StubState {
                capture: capture.clone(),
                payload,
            });
        let base = spawn_stub(router).await;
        let config = test_config(&format!("{base}/v1/occupation"), DEFAULT_ONET_API_URL);
        (CareerOneStopClient::new(&config).unwrap(), capture)
    }

    #[test]
    fn test_normalize_drops_incomplete_records() {
        let body: OccupationListResponse = serde_json::from_value(json!({
            "OccupationList": [
                { "OnetCode": "15-1252.00", "OnetTitle": "Software Developers" },
                { "OnetCode": "15-1253.00" },
                { "OnetCode": "15-1254.00", "OnetTitle": "Web Developers" }
            ]
        }))
        .unwrap();

        assert_eq!(
            normalize(body),
            vec![
                occupation("15-1252.00", "Software Developers"),
                occupation("15-1254.00", "Web Developers"),
            ]
        );
    }

    #[test]
    fn test_normalize_missing_or_null_list_is_empty() {
        let missing: OccupationListResponse = serde_json::from_value(json!({})).unwrap();
        assert!(normalize(missing).is_empty());

        let null: OccupationListResponse =
            serde_json::from_value(json!({ "OccupationList": null })).unwrap();
        assert!(normalize(null).is_empty());
    }

    #[test]
    fn test_normalize_drops_empty_and_null_fields() {
        let body: OccupationListResponse = serde_json::from_value(json!({
            "OccupationList": [
                { "OnetCode": "", "OnetTitle": "Blank Code" },
                { "OnetCode": "29-1141.00", "OnetTitle": null },
                { "OnetCode": "29-1141.00", "OnetTitle": "Registered Nurses" }
            ]
        }))
        .unwrap();

        assert_eq!(
            normalize(body),
            vec![occupation("29-1141.00", "Registered Nurses")]
        );
    }

    #[test]
    fn test_normalize_keeps_valid_records_beside_mistyped_and_null_entries() {
        let body: OccupationListResponse = serde_json::from_value(json!({
            "OccupationList": [
                { "OnetCode": "15-1252.00", "OnetTitle": "Software Developers" },
                { "OnetCode": 151253, "OnetTitle": "Testers" },
                null,
                { "OnetCode": "15-1254.00", "OnetTitle": ["Web Developers"] }
            ]
        }))
        .unwrap();

        assert_eq!(
            normalize(body),
            vec![occupation("15-1252.00", "Software Developers")]
        );
    }

    #[test]
    fn test_occupation_url_encodes_keyword_segment() {
        let config = test_config(
            "https://api.careeronestop.org/v1/occupation/",
            DEFAULT_ONET_API_URL,
        );
        let client = CareerOneStopClient::new(&config).unwrap();

        let url = client.occupation_url("software developer", 3).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.careeronestop.org/v1/occupation/test-user/software%20developer/N/0/3"
        );
    }

    #[test]
    fn test_occupation_url_rejects_dot_segments() {
        let config = test_config(
            "https://api.careeronestop.org/v1/occupation",
            DEFAULT_ONET_API_URL,
        );
        let client = CareerOneStopClient::new(&config).unwrap();

        for keyword in [".", ".."] {
            assert!(matches!(
                client.occupation_url(keyword, 3),
                Err(ProviderError::UnroutableKeyword(_))
            ));
        }
        assert!(client.occupation_url("...", 3).is_ok());
    }

    #[tokio::test]
    async fn test_search_keeps_valid_records_when_siblings_are_malformed() {
        let (client, _) = stub_client(json!({
            "OccupationList": [
                { "OnetCode": "15-1252.00", "OnetTitle": "Software Developers" },
                { "OnetCode": 151253, "OnetTitle": "Testers" },
                null
            ]
        }))
        .await;

        assert_eq!(
            client.search("software developer", 3).await,
            vec![occupation("15-1252.00", "Software Developers")]
        );
    }

    #[tokio::test]
    async fn test_search_sends_expected_request_and_returns_records() {
        let (client, capture) = stub_client(json!({
            "OccupationList": [
                { "OnetCode": "15-1252.00", "OnetTitle": "Software Developers" }
            ]
        }))
        .await;

        let results = client.search("software developer", 3).await;
        assert_eq!(results, vec![occupation("15-1252.00", "Software Developers")]);

        let captured = capture.lock().unwrap().clone().unwrap();
        assert_eq!(
            captured.segments,
            vec!["test-user", "software developer", "N", "0", "3"]
        );
        let param = |name: &str| captured.query.get(name).map(String::as_str);
        assert_eq!(param("datasettype"), Some("onet"));
        assert_eq!(param("searchby"), Some("title"));
        assert_eq!(captured.authorization.as_deref(), Some("Bearer test-token"));
        assert_eq!(captured.accept.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_search_does_not_truncate_upstream_list() {
        let (client, _) = stub_client(json!({
            "OccupationList": [
                { "OnetCode": "11-1011.00", "OnetTitle": "Chief Executives" },
                { "OnetCode": "11-1021.00", "OnetTitle": "General and Operations Managers" },
                { "OnetCode": "11-2021.00", "OnetTitle": "Marketing Managers" }
            ]
        }))
        .await;

        assert_eq!(client.search("manager", 1).await.len(), 3);
    }

    #[tokio::test]
    async fn test_search_soft_fails_on_error_status() {
        let router = Router::new().route(
            "/v1/occupation/*rest",
            get(|| async { (StatusCode::UNAUTHORIZED, "invalid token") }),
        );
        let base = spawn_stub(router).await;
        let config = test_config(&format!("{base}/v1/occupation"), DEFAULT_ONET_API_URL);
        let client = CareerOneStopClient::new(&config).unwrap();

        assert!(client.search("nurse", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_soft_fails_on_non_json_body() {
        let router = Router::new().route(
            "/v1/occupation/*rest",
            get(|| async { "<html>maintenance</html>" }),
        );
        let base = spawn_stub(router).await;
        let config = test_config(&format!("{base}/v1/occupation"), DEFAULT_ONET_API_URL);
        let client = CareerOneStopClient::new(&config).unwrap();

        assert!(client.search("nurse", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_soft_fails_on_timeout() {
        let router = Router::new().route(
            "/v1/occupation/*rest",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({ "OccupationList": [] }))
            }),
        );
        let base = spawn_stub(router).await;
        let mut config = test_config(&format!("{base}/v1/occupation"), DEFAULT_ONET_API_URL);
        config.provider_timeout = Duration::from_millis(100);
        let client = CareerOneStopClient::new(&config).unwrap();

        assert!(client.search("nurse", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_soft_fails_when_unreachable() {
        let config = test_config("http://127.0.0.1:1/v1/occupation", DEFAULT_ONET_API_URL);
        let client = CareerOneStopClient::new(&config).unwrap();

        assert!(client.search("nurse", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_soft_fails_on_invalid_endpoint() {
        let config = test_config("not a url", DEFAULT_ONET_API_URL);
        let client = CareerOneStopClient::new(&config).unwrap();

        assert!(client.search("nurse", 3).await.is_empty());
    }
}
