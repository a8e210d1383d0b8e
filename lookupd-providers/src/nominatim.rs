//! Forward geocoding via the OSM Nominatim API.

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lookupd_core::{LookupError, Result};

/// User-Agent sent with every request, as Nominatim's usage policy requires
/// an identifying agent string.
const USER_AGENT: &str = concat!("lookupd/", env!("CARGO_PKG_VERSION"));

/// Nominatim client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NominatimConfig {
    /// Base URL of the Nominatim API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".into(),
            timeout_seconds: 30,
        }
    }
}

/// A single result from the Nominatim search API.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NominatimResult {
    /// Nominatim place identifier
    pub place_id: i64,
    /// Data licence string
    pub licence: String,
    /// OSM object type (`node`, `way`, `relation`)
    pub osm_type: String,
    /// OSM object identifier
    pub osm_id: i64,
    /// Latitude as a decimal string
    pub lat: String,
    /// Longitude as a decimal string
    pub lon: String,
    /// OSM class of the object
    pub class: String,
    /// OSM type within the class
    #[serde(rename = "type")]
    pub kind: String,
    /// Search rank of the place
    pub place_rank: i32,
    /// Computed importance of the place
    pub importance: f64,
    /// Address type label
    #[serde(rename = "addresstype")]
    pub address_type: String,
    /// Short place name
    pub name: String,
    /// Full display name
    pub display_name: String,
    /// Bounding box as `[south, north, west, east]` decimal strings
    #[serde(rename = "boundingbox")]
    pub bounding_box: Vec<String>,
}

/// Client for the Nominatim search API.
pub struct NominatimClient {
    config: NominatimConfig,
    http_client: reqwest::Client,
}

impl NominatimClient {
    /// Creates a new Nominatim client.
    pub fn with_config(config: NominatimConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Searches for a free-form address.
    ///
    /// Nominatim needs no API key. An empty result list is returned as-is.
    #[instrument(skip(self))]
    pub async fn search(&self, address: &str) -> Result<Vec<NominatimResult>> {
        let url = format!("{}/search", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("q", address), ("format", "json")])
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| LookupError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::UpstreamStatus {
                provider: "Nominatim",
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| LookupError::HttpError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_result_deserializes() {
        let body = serde_json::json!([{
            "place_id": 297927271,
            "licence": "Data © OpenStreetMap contributors, ODbL 1.0",
            "osm_type": "way",
            "osm_id": 207131838,
            "lat": "37.4223",
            "lon": "-122.0841",
            "class": "building",
            "type": "commercial",
            "place_rank": 30,
            "importance": 0.41,
            "addresstype": "building",
            "name": "Googleplex",
            "display_name": "Googleplex, 1600, Amphitheatre Parkway, Mountain View, CA, USA",
            "boundingbox": ["37.4217", "37.4229", "-122.0852", "-122.0829"]
        }]);

        let parsed: Vec<NominatimResult> = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].kind, "commercial");
        assert_eq!(parsed[0].address_type, "building");
        assert_eq!(parsed[0].bounding_box.len(), 4);
    }

    #[tokio::test]
    async fn test_search_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("format", "json"))
            .and(header_exists("User-Agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = NominatimClient::with_config(NominatimConfig {
            base_url: server.uri(),
            timeout_seconds: 5,
        });

        let results = client.search("nowhere").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_non_200_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403).set_body_string("blocked"))
            .mount(&server)
            .await;

        let client = NominatimClient::with_config(NominatimConfig {
            base_url: server.uri(),
            timeout_seconds: 5,
        });

        let err = client.search("nowhere").await.unwrap_err();
        assert!(matches!(
            err,
            LookupError::UpstreamStatus { provider: "Nominatim", status: 403, .. }
        ));
    }
}
