//! Occupation-code lookup: two provider clients and the fallback search
//! that chains them.
//!
//! Provider clients never return errors to their callers. Every failure is
//! logged with its `ProviderError` and collapsed into an empty list, so the
//! search can move on to the next provider.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod careeronestop;
pub mod onet;
pub mod search;

#[cfg(test)]
pub(crate) mod test_support;

pub const DEFAULT_N_RESULTS: u32 = 3;

/// A normalized occupation record. Both fields are always non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupationResult {
    pub code: String,
    pub title: String,
}

impl OccupationResult {
    /// Builds a record from upstream fields, or `None` if either is missing or empty.
    pub fn from_parts(code: Option<String>, title: Option<String>) -> Option<Self> {
        match (code, title) {
            (Some(code), Some(title)) if !code.is_empty() && !title.is_empty() => {
                Some(Self { code, title })
            }
            _ => None,
        }
    }

    /// Reads one raw upstream entry. Entries that are not objects, or whose
    /// fields are missing, null, non-string or empty, yield `None`.
    pub fn from_entry(entry: &Value, code_field: &str, title_field: &str) -> Option<Self> {
        let field = |name: &str| {
            entry
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self::from_parts(field(code_field), field(title_field))
    }
}

/// Arguments of the `search_onet_codes` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
    #[serde(default = "default_n_results")]
    pub n_results: u32,
}

fn default_n_results() -> u32 {
    DEFAULT_N_RESULTS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResult {
    pub error: String,
    pub keyword: String,
}

impl ErrorResult {
    pub fn no_codes_found(keyword: &str) -> Self {
        Self {
            error: format!("No O*NET codes found for keyword: '{keyword}'"),
            keyword: keyword.to_string(),
        }
    }
}

/// What the tool returns: a JSON array of records or a JSON error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchOutcome {
    Found(Vec<OccupationResult>),
    NotFound(ErrorResult),
}

/// Why a provider call produced nothing. Only ever logged.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("keyword '{0}' cannot be used as a URL path segment")]
    UnroutableKeyword(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(e)
        }
    }
}

/// An upstream occupation search service.
///
/// Implementations soft-fail: any error yields an empty list.
#[async_trait]
pub trait OccupationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, keyword: &str, n_results: u32) -> Vec<OccupationResult>;
}

/// Builds the HTTP client shared by the provider clients.
/// Idle connections are not pooled, so each call releases its connection when done.
pub(crate) fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder().pool_max_idle_per_host(0).build()
}

/// Sends a request and decodes a JSON body, mapping every failure to `ProviderError`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
