//! Address autocompletion via the Google Places Autocomplete API.
//!
//! Predictions are localized to pt-BR and post-processed so Brazilian state
//! names appear as their two-letter abbreviations.

use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use lookupd_core::{LookupError, Result};

/// Brazilian state names and their two-letter abbreviations.
const STATE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Acre", "AC"),
    ("Alagoas", "AL"),
    ("Amapá", "AP"),
    ("Amazonas", "AM"),
    ("Bahia", "BA"),
    ("Ceará", "CE"),
    ("Distrito Federal", "DF"),
    ("Espírito Santo", "ES"),
    ("Goiás", "GO"),
    ("Maranhão", "MA"),
    ("Mato Grosso", "MT"),
    ("Mato Grosso do Sul", "MS"),
    ("Minas Gerais", "MG"),
    ("Pará", "PA"),
    ("Paraíba", "PB"),
    ("Paraná", "PR"),
    ("Pernambuco", "PE"),
    ("Piauí", "PI"),
    ("Rio de Janeiro", "RJ"),
    ("Rio Grande do Norte", "RN"),
    ("Rio Grande do Sul", "RS"),
    ("Rondônia", "RO"),
    ("Roraima", "RR"),
    ("Santa Catarina", "SC"),
    ("São Paulo", "SP"),
    ("Sergipe", "SE"),
    ("Tocantins", "TO"),
];

/// Places Autocomplete client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Base URL of the Google Maps API
    pub base_url: String,
    /// Google API key
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com".into(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

/// Response from the Places Autocomplete API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    /// Prediction list, best first
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    /// Upstream status string (`OK`, `ZERO_RESULTS`, ...)
    pub status: String,
    /// Upstream error details, when provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// A single autocomplete prediction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Prediction {
    /// Suggested address text
    pub description: String,
    /// Google place identifier
    pub place_id: String,
}

/// Client for the Google Places Autocomplete API.
pub struct PlacesClient {
    config: PlacesConfig,
    http_client: reqwest::Client,
}

impl PlacesClient {
    /// Creates a new Places client.
    pub fn with_config(config: PlacesConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Fetches autocomplete predictions for a partial address.
    ///
    /// When the caller supplies no session token a fresh UUID is generated,
    /// so Google bills the request as its own session.
    #[instrument(skip(self))]
    pub async fn autocomplete(
        &self,
        input: &str,
        session_token: Option<&str>,
    ) -> Result<AutocompleteResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LookupError::MissingApiKey("Google"))?;

        let generated;
        let session_token = match session_token {
            Some(token) => token,
            None => {
                generated = Uuid::new_v4().to_string();
                &generated
            }
        };

        let url = format!("{}/maps/api/place/autocomplete/json", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("input", input),
                ("key", api_key),
                ("sessiontoken", session_token),
                ("language", "pt-BR"),
            ])
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

        let autocomplete: AutocompleteResponse = response
            .json()
            .await
            .map_err(|e| LookupError::HttpError(e.to_string()))?;

        if autocomplete.status != "OK" && autocomplete.status != "ZERO_RESULTS" {
            return Err(LookupError::ProviderStatus {
                provider: "Google",
                status: autocomplete.status,
            });
        }

        Ok(autocomplete)
    }
}

/// Replaces a full Brazilian state name in `description` with its two-letter
/// abbreviation.
///
/// Descriptions that already contain an abbreviation are left unchanged; at
/// most one replacement is made.
pub fn abbreviate_state(description: &str) -> String {
    for (_, abbreviation) in STATE_ABBREVIATIONS {
        if description.contains(abbreviation) {
            return description.to_string();
        }
    }

    for (state, abbreviation) in STATE_ABBREVIATIONS {
        if description.contains(state) {
            return description.replacen(state, abbreviation, 1);
        }
    }

    description.to_string()
}
