//! Forward geocoding via the Google Geocoding API.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use lookupd_core::{LookupError, Result};

/// Google Geocoding client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the Google Maps API
    pub base_url: String,
    /// Google API key
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com".into(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

/// Response from the Google Geocoding API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeocodingResponse {
    /// Geocoding matches, best first
    #[serde(default)]
    pub results: Vec<GeocodingResult>,
    /// Upstream status string (`OK`, `ZERO_RESULTS`, ...)
    pub status: String,
}

/// A single result in the geocoding response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeocodingResult {
    /// Human-readable address
    pub formatted_address: String,
    /// Location information
    pub geometry: GeometryData,
    /// Google place identifier
    pub place_id: String,
    /// Result type tags
    #[serde(default)]
    pub types: Vec<String>,
    /// Structured address parts
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

/// Location information for a result.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeometryData {
    /// Geocoded coordinates
    pub location: LatLngData,
    /// Precision of the geocode (`ROOFTOP`, `APPROXIMATE`, ...)
    pub location_type: String,
    /// Recommended viewport for displaying the result
    pub viewport: ViewportData,
}

/// A latitude/longitude pair.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LatLngData {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

/// A viewport bounding box.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ViewportData {
    /// Northeast corner
    pub northeast: LatLngData,
    /// Southwest corner
    pub southwest: LatLngData,
}

/// One component of a structured address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddressComponent {
    /// Full text of the component
    pub long_name: String,
    /// Abbreviated text of the component
    pub short_name: String,
    /// Component type tags
    #[serde(default)]
    pub types: Vec<String>,
}

/// Client for the Google Geocoding API.
pub struct GeocodingClient {
    config: GeocodingConfig,
    http_client: reqwest::Client,
}

impl GeocodingClient {
    /// Creates a new geocoding client.
    pub fn with_config(config: GeocodingConfig) -> Self {
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
    /// A `ZERO_RESULTS` status is not an error; the empty result list is
    /// returned as-is. Any other non-`OK` status is rejected.
    #[instrument(skip(self))]
    pub async fn geocode(&self, address: &str) -> Result<GeocodingResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LookupError::MissingApiKey("Google"))?;

        let url = format!("{}/maps/api/geocode/json", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("address", address), ("key", api_key)])
            .send()
            .await
            .map_err(|e| LookupError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::UpstreamStatus {
                provider: "Google",
                status: status.as_u16(),
                body,
            });
        }

        let geocoding: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| LookupError::HttpError(e.to_string()))?;

        if geocoding.status != "OK" && geocoding.status != "ZERO_RESULTS" {
            return Err(LookupError::ProviderStatus {
                provider: "Google",
                status: geocoding.status,
            });
        }

        Ok(geocoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixture() -> serde_json::Value {
        serde_json::json!({
            "results": [{
                "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
                "geometry": {
                    "location": {"lat": 37.4224, "lng": -122.0842},
                    "location_type": "ROOFTOP",
                    "viewport": {
                        "northeast": {"lat": 37.4237, "lng": -122.0828},
                        "southwest": {"lat": 37.4211, "lng": -122.0855}
                    }
                },
                "place_id": "ChIJ2eUgeAK6j4ARbn5u_wAGqWA",
                "types": ["street_address"],
                "address_components": [
                    {"long_name": "1600", "short_name": "1600", "types": ["street_number"]}
                ]
            }],
            "status": "OK"
        })
    }

    #[test]
    fn test_response_deserializes() {
        let parsed: GeocodingResponse = serde_json::from_value(fixture()).unwrap();
        assert_eq!(parsed.status, "OK");
        assert_eq!(parsed.results.len(), 1);
        let result = &parsed.results[0];
        assert_eq!(result.geometry.location.lat, 37.4224);
        assert_eq!(result.geometry.location_type, "ROOFTOP");
        assert_eq!(result.address_components[0].short_name, "1600");
    }

    #[tokio::test]
    async fn test_geocode_requires_api_key() {
        let client = GeocodingClient::with_config(GeocodingConfig::default());
        let err = client.geocode("somewhere").await.unwrap_err();
        assert!(matches!(err, LookupError::MissingApiKey("Google")));
    }

    #[tokio::test]
    async fn test_geocode_rejects_denied_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [],
                "status": "REQUEST_DENIED"
            })))
            .mount(&server)
            .await;

        let client = GeocodingClient::with_config(GeocodingConfig {
            base_url: server.uri(),
            api_key: Some("key".into()),
            timeout_seconds: 5,
        });

        let err = client.geocode("somewhere").await.unwrap_err();
        assert!(matches!(
            err,
            LookupError::ProviderStatus { provider: "Google", .. }
        ));
    }

    #[tokio::test]
    async fn test_geocode_accepts_zero_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .and(query_param("address", "nowhere"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [],
                "status": "ZERO_RESULTS"
            })))
            .mount(&server)
            .await;

        let client = GeocodingClient::with_config(GeocodingConfig {
            base_url: server.uri(),
            api_key: Some("key".into()),
            timeout_seconds: 5,
        });

        let geocoding = client.geocode("nowhere").await.unwrap();
        assert!(geocoding.results.is_empty());
        assert_eq!(geocoding.status, "ZERO_RESULTS");
    }
}
