//! Forward geocoding via the Geoapify API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use lookupd_core::{LookupError, Result};

/// Geoapify client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeoapifyConfig {
    /// Base URL of the Geoapify API
    pub base_url: String,
    /// Geoapify API key
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for GeoapifyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.geoapify.com".into(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

/// Top-level response from the Geoapify geocoding API (GeoJSON shaped).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeoapifyResponse {
    /// GeoJSON object type
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Matched features, best first
    #[serde(default)]
    pub features: Vec<GeoapifyFeature>,
    /// Echo of the query
    #[serde(default)]
    pub query: Option<GeoapifyQuery>,
}

/// A single feature in the response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeoapifyFeature {
    /// GeoJSON object type
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Detailed location data
    pub properties: GeoapifyProperties,
    /// Geographic location
    pub geometry: GeoapifyGeometry,
    /// Bounding box, when provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
}

/// Location details for a feature.
///
/// Nested objects with variable structure (datasource, timezone, rank) are
/// kept as raw JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoapifyProperties {
    /// Data source attribution
    pub datasource: Option<Value>,
    /// Country name
    pub country: String,
    /// ISO country code
    pub country_code: String,
    /// State name
    pub state: String,
    /// County name
    pub county: String,
    /// City name
    pub city: String,
    /// Postal code
    pub postcode: String,
    /// Suburb, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    /// Street name
    pub street: String,
    /// House number, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housenumber: Option<String>,
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// State code, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    /// Match granularity (`building`, `street`, ...)
    pub result_type: String,
    /// Full formatted address
    pub formatted: String,
    /// First address line
    pub address_line1: String,
    /// Second address line
    pub address_line2: String,
    /// Place category, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Timezone details, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<Value>,
    /// Plus code, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plus_code: Option<String>,
    /// Short plus code, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plus_code_short: Option<String>,
    /// Match confidence details, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<Value>,
    /// Geoapify place identifier, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

/// Geographic location of a feature.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeoapifyGeometry {
    /// Geometry type (`Point`)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// `[lon, lat]` coordinates
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

/// Echo of the query as understood by Geoapify.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoapifyQuery {
    /// The query text
    pub text: String,
    /// Parsed query parts, when provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<Value>,
}

/// Client for the Geoapify geocoding API.
pub struct GeoapifyClient {
    config: GeoapifyConfig,
    http_client: reqwest::Client,
}

impl GeoapifyClient {
    /// Creates a new Geoapify client.
    pub fn with_config(config: GeoapifyConfig) -> Self {
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
    /// An empty feature list is returned as-is; the caller decides whether
    /// that is worth reporting (the gateway serves it with an error note
    /// alongside the partial body).
    #[instrument(skip(self))]
    pub async fn search(&self, address: &str) -> Result<GeoapifyResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LookupError::MissingApiKey("Geoapify"))?;

        let url = format!("{}/v1/geocode/search", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("text", address), ("apiKey", api_key)])
            .send()
            .await
            .map_err(|e| LookupError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::UpstreamStatus {
                provider: "Geoapify",
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

    #[test]
    fn test_response_deserializes() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {
                    "datasource": {"sourcename": "openstreetmap"},
                    "country": "Brazil",
                    "country_code": "br",
                    "state": "São Paulo",
                    "county": "",
                    "city": "São Paulo",
                    "postcode": "01310-100",
                    "street": "Avenida Paulista",
                    "housenumber": "1578",
                    "lon": -46.6565,
                    "lat": -23.5614,
                    "result_type": "building",
                    "formatted": "Avenida Paulista 1578, São Paulo, Brazil",
                    "address_line1": "Avenida Paulista 1578",
                    "address_line2": "São Paulo, Brazil",
                    "rank": {"confidence": 1.0}
                },
                "geometry": {"type": "Point", "coordinates": [-46.6565, -23.5614]},
                "bbox": [-46.657, -23.562, -46.656, -23.561]
            }],
            "query": {"text": "Avenida Paulista 1578"}
        });

        let parsed: GeoapifyResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.kind, "FeatureCollection");
        assert_eq!(parsed.features.len(), 1);
        let props = &parsed.features[0].properties;
        assert_eq!(props.city, "São Paulo");
        assert_eq!(props.housenumber.as_deref(), Some("1578"));
        assert_eq!(props.lat, -23.5614);
        assert_eq!(parsed.query.as_ref().unwrap().text, "Avenida Paulista 1578");
    }

    #[test]
    fn test_empty_feature_list_is_valid() {
        let parsed: GeoapifyResponse =
            serde_json::from_value(serde_json::json!({"type": "FeatureCollection", "features": []}))
                .unwrap();
        assert!(parsed.features.is_empty());
    }

    #[tokio::test]
    async fn test_search_requires_api_key() {
        let client = GeoapifyClient::with_config(GeoapifyConfig::default());
        let err = client.search("somewhere").await.unwrap_err();
        assert!(matches!(err, LookupError::MissingApiKey("Geoapify")));
    }
}
