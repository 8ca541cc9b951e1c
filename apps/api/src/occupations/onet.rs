//! O*NET Web Services keyword search, the fallback provider.
//!
//! The search endpoint has no result-count parameter, so the list is
//! truncated here before records are normalized.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::occupations::{
    build_http_client, fetch_json, OccupationProvider, OccupationResult, ProviderError,
};

/// Entries stay raw so one bad record cannot fail the whole body.
#[derive(Debug, Deserialize)]
struct OnetSearchResponse {
    #[serde(default)]
    occupation: Option<Vec<Value>>,
    #[serde(default)]
    occupations: Option<Vec<Value>>,
}

impl OnetSearchResponse {
    /// `occupation` wins when it holds entries; otherwise `occupations`.
    fn into_entries(self) -> Vec<Value> {
        self.occupation
            .filter(|entries| !entries.is_empty())
            .or(self.occupations)
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct OnetClient {
    client: Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl OnetClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: build_http_client().context("Failed to build O*NET HTTP client")?,
            url: config.onet_api_url.clone(),
            api_key: config.onet_api_key.clone(),
            timeout: config.provider_timeout,
        })
    }

    async fn try_search(
        &self,
        keyword: &str,
        n_results: u32,
    ) -> Result<Vec<OccupationResult>, ProviderError> {
        let request = self
            .client
            .get(&self.url)
            .header("X-API-Key", &self.api_key)
            .query(&[("keyword", keyword)])
            .timeout(self.timeout);

        let body: OnetSearchResponse = fetch_json(request).await?;
        let entries = body.into_entries();
        if entries.is_empty() {
            warn!("O*NET API returned no occupations for keyword: '{keyword}'");
            return Ok(vec![]);
        }

        Ok(normalize(entries, n_results))
    }
}

/// Truncates to `n_results` first, then drops incomplete records.
fn normalize(entries: Vec<Value>, n_results: u32) -> Vec<OccupationResult> {
    entries
        .iter()
        .take(n_results as usize)
        .filter_map(|entry| OccupationResult::from_entry(entry, "code", "title"))
        .collect()
}

#[async_trait]
impl OccupationProvider for OnetClient {
    fn name(&self) -> &'static str {
        "O*NET"
    }

    async fn search(&self, keyword: &str, n_results: u32) -> Vec<OccupationResult> {
        info!("Searching O*NET API for keyword: '{keyword}'");

        match self.try_search(keyword, n_results).await {
            Ok(results) => {
                info!("O*NET API returned {} results", results.len());
                results
            }
            Err(e) => {
                warn!("O*NET API request failed: {e}");
                vec![]
            }
        }
    }
}
