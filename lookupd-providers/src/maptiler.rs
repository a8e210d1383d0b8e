//! Forward geocoding via the MapTiler API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use lookupd_core::{LookupError, Result};

/// MapTiler client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapTilerConfig {
    /// Base URL of the MapTiler API
    pub base_url: String,
    /// MapTiler API key
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for MapTilerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.maptiler.com".into(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

/// Top-level response from the MapTiler geocoding API (GeoJSON shaped).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapTilerResponse {
    /// GeoJSON object type; may be absent upstream, callers default it to
    /// `FeatureCollection` before serving
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Matched features, best first
    #[serde(default)]
    pub features: Vec<MapTilerFeature>,
    /// Echo of the query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
}

/// A single feature in the response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapTilerFeature {
    /// GeoJSON object type
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Detailed location data
    pub properties: MapTilerProperties,
    /// Geographic location
    pub geometry: MapTilerGeometry,
    /// Bounding box, when provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
}

/// Location details for a feature.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapTilerProperties {
    /// Short place name
    pub name: String,
    /// Full display label
    pub label: String,
    /// Match score, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// House number, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housenumber: Option<String>,
    /// Street name, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    /// Neighbourhood, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbourhood: Option<String>,
    /// Suburb, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    /// District, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Postal code, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    /// City, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// County, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    /// State, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Country, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// ISO country code, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Region, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Region code, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    /// Full formatted address, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    /// First address line, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    /// Second address line, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    /// Place category, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Timezone name, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Match granularity, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type: Option<String>,
    /// Result rank, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<f64>,
    /// Place type, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
}

/// Geographic location of a feature.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapTilerGeometry {
    /// Geometry type (`Point`)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// `[lon, lat]` coordinates
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

/// Client for the MapTiler geocoding API.
pub struct MapTilerClient {
    config: MapTilerConfig,
    http_client: reqwest::Client,
}

impl MapTilerClient {
    /// Creates a new MapTiler client.
    pub fn with_config(config: MapTilerConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Geocodes a free-form address.
    ///
    /// The address travels in the URL path, so it is escaped as a path
    /// segment. An empty feature list is returned as-is.
    #[instrument(skip(self))]
    pub async fn search(&self, address: &str) -> Result<MapTilerResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LookupError::MissingApiKey("MapTiler"))?;

        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| LookupError::ConfigError(format!("invalid MapTiler base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| LookupError::ConfigError("invalid MapTiler base URL".into()))?
            .push("geocoding")
            .push(&format!("{address}.json"));
        url.query_pairs_mut()
            .append_pair("autocomplete", "false")
            .append_pair("fuzzyMatch", "true")
            .append_pair("limit", "3")
            .append_pair("key", api_key);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::UpstreamStatus {
                provider: "MapTiler",
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
