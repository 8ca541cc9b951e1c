use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

pub const DEFAULT_CAREER_ONE_STOP_ENDPOINT: &str = "https://api.careeronestop.org/v1/occupation";
pub const DEFAULT_ONET_API_URL: &str = "https://api-v2.onetcenter.org/online/search";

/// Application configuration loaded from environment variables.
///
/// Provider secrets are not required at startup. A missing secret is logged
/// and surfaces later as a rejected provider call.
#[derive(Debug, Clone)]
pub struct Config {
    pub career_one_stop_user_id: String,
    pub career_one_stop_token: String,
    pub career_one_stop_endpoint: String,
    pub onet_api_key: String,
    pub onet_api_url: String,
    pub provider_timeout: Duration,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            career_one_stop_user_id: secret_env("CAREER_ONE_STOP_WEB_API_USER_ID"),
            career_one_stop_token: secret_env("CAREER_ONE_STOP_WEB_API_TOKEN_KEY"),
            career_one_stop_endpoint: std::env::var("CAREER_ONE_STOP_OCCUPATION_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_CAREER_ONE_STOP_ENDPOINT.to_string()),
            onet_api_key: secret_env("ONET_API_KEY"),
            onet_api_url: std::env::var("ONET_API_URL")
                .unwrap_or_else(|_| DEFAULT_ONET_API_URL.to_string()),
            provider_timeout: Duration::from_secs(
                std::env::var("PROVIDER_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse::<u64>()
                    .context("PROVIDER_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Names of provider secrets that are unset or blank.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        [
            ("CAREER_ONE_STOP_WEB_API_USER_ID", &self.career_one_stop_user_id),
            ("CAREER_ONE_STOP_WEB_API_TOKEN_KEY", &self.career_one_stop_token),
            ("ONET_API_KEY", &self.onet_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect()
    }

    /// Logs one warning per missing provider secret.
    pub fn warn_missing_secrets(&self) {
        for key in self.missing_secrets() {
            warn!("Environment variable '{key}' is not set; its provider will reject requests");
        }
    }
}

fn secret_env(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}

#[cfg(test)]
pub(crate) fn test_config(career_one_stop_endpoint: &str, onet_api_url: &str) -> Config {
    Config {
        career_one_stop_user_id: "test-user".to_string(),
        career_one_stop_token: "test-token".to_string(),
        career_one_stop_endpoint: career_one_stop_endpoint.to_string(),
        onet_api_key: "test-key".to_string(),
        onet_api_url: onet_api_url.to_string(),
        provider_timeout: Duration::from_secs(2),
        host: "127.0.0.1".to_string(),
        port: 0,
        rust_log: "info".to_string(),
    }
}
