//! WHOIS lookups via the jsonwhois.com API.
//!
//! The upstream response carries the registry's free-text output in a `raw`
//! field; the key/value pairs found there are parsed out and merged into the
//! returned object so clients get structured fields without re-parsing.

use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use lookupd_core::{LookupError, Result};

/// WHOIS client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WhoisConfig {
    /// Base URL of the jsonwhois API
    pub base_url: String,
    /// API key (`Authorization: Token token=...`)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for WhoisConfig {
    fn default() -> Self {
        Self {
            base_url: "https://jsonwhois.com".into(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

/// A WHOIS record: the upstream JSON object plus the parsed `raw` fields.
pub type WhoisRecord = serde_json::Map<String, Value>;

/// Client for the jsonwhois.com WHOIS API.
pub struct WhoisClient {
    config: WhoisConfig,
    http_client: reqwest::Client,
}

impl WhoisClient {
    /// Creates a new WHOIS client.
    pub fn with_config(config: WhoisConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Fetches the WHOIS record for a domain.
    #[instrument(skip(self))]
    pub async fn lookup(&self, domain: &str) -> Result<WhoisRecord> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LookupError::MissingApiKey("jsonwhois"))?;

        let url = format!("{}/api/v1/whois", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("domain", domain)])
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, format!("Token token={api_key}"))
            .send()
            .await
            .map_err(|e| LookupError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::UpstreamStatus {
                provider: "jsonwhois",
                status: status.as_u16(),
                body,
            });
        }

        let mut record: WhoisRecord = response
            .json()
            .await
            .map_err(|e| LookupError::HttpError(e.to_string()))?;

        if let Some(Value::String(raw)) = record.get("raw").cloned() {
            let parsed = parse_raw_record(&raw);
            debug!(domain, fields = parsed.len(), "parsed raw WHOIS output");
            for (key, value) in parsed {
                record.insert(key, Value::String(value));
            }
        }

        Ok(record)
    }
}

/// Extracts `key: value` lines from free-text WHOIS output.
///
/// A line qualifies when, after leading whitespace, it starts with a key made
/// of word characters or hyphens, followed by a colon, whitespace, and a
/// non-empty value. Later occurrences of a key win.
fn parse_raw_record(raw: &str) -> Vec<(String, String)> {
    raw.lines()
        .filter_map(|line| {
            let line = line.trim_start();
            let (key, rest) = line.split_once(':')?;
            if key.is_empty()
                || !key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return None;
            }
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            let value = rest.trim();
            if value.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
