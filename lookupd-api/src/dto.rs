//! Request/response DTOs and the cached payload type.

use serde::{Deserialize, Serialize};

use lookupd_providers::{
    AutocompleteResponse, GeoapifyResponse, GeocodingResponse, MapTilerResponse, NominatimResult,
    WhoisRecord,
};

/// The payload stored in the shared cache: one variant per cached endpoint.
///
/// The cache itself stays generic and never looks inside; key prefixes keep
/// variants from colliding, and a variant mismatch on a hit is simply treated
/// as a miss.
#[derive(Clone)]
pub enum CachedLookup {
    /// WHOIS record
    Whois(WhoisRecord),
    /// Google geocoding response
    Geocode(GeocodingResponse),
    /// Geoapify geocoding response
    Geoapify(GeoapifyResponse),
    /// MapTiler geocoding response
    MapTiler(MapTilerResponse),
    /// Nominatim result list
    Nominatim(Vec<NominatimResult>),
    /// Autocomplete predictions, already state-abbreviated
    Autocomplete(AutocompleteResponse),
}

/// Query parameters for the geocoding endpoints.
#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    /// Free-form address to geocode
    pub address: Option<String>,
}

/// Query parameters for the autocomplete endpoint.
#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    /// Partial address input
    pub q: Option<String>,
    /// Places session token; generated when absent
    pub sessiontoken: Option<String>,
}

/// Body of `POST /external/send-email`.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    /// Subject line
    #[serde(default)]
    pub subject: String,
    /// HTML body
    #[serde(default)]
    pub body_html: String,
    /// Sender address
    #[serde(default)]
    pub sender: String,
    /// Recipient addresses
    #[serde(default)]
    pub recipients: Vec<String>,
}

/// Response of `POST /external/send-email`.
#[derive(Debug, Serialize)]
pub struct EmailResponse {
    /// Human-readable outcome
    pub message: String,
    /// MailerSend message ids, one per accepted recipient
    pub message_ids: Vec<String>,
}

/// Response of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `ok` when the server answers
    pub status: String,
    /// Crate version
    pub version: String,
    /// Seconds since the server state was built
    pub uptime_seconds: u64,
    /// Physical entry count of the shared cache
    pub cache_entries: usize,
    /// Entries still visible to lookups
    pub cache_valid_entries: usize,
    /// Entries past their deadline awaiting the next sweep
    pub cache_expired_entries: usize,
}
