//! API route handlers.
//!
//! Every lookup handler follows the same write-through discipline: build a
//! prefix-qualified cache key, probe the shared cache, and only on a miss
//! call the upstream provider, storing the parsed result afterwards. No cache
//! lock is ever held across a provider call.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use lookupd_core::LookupError;
use lookupd_providers::{
    autocomplete::abbreviate_state, email::is_valid_address, AutocompleteResponse, EmailMessage,
    GeocodingResponse, MapTilerResponse, NominatimResult, WhoisRecord,
};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// TTL applied to every successful lookup.
pub(crate) const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

fn require_param(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(format!(
            "Missing '{name}' query parameter"
        ))),
    }
}

/// GET /
pub async fn root() -> &'static str {
    "Hello World!"
}

/// GET /external/whois/:domain
pub async fn whois(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
) -> Result<Json<WhoisRecord>> {
    let cache_key = format!("whois:{domain}");
    if let Some(CachedLookup::Whois(record)) = state.cache.get(&cache_key) {
        debug!(domain, "serving WHOIS from cache");
        return Ok(Json(record));
    }

    let record = state.whois.lookup(&domain).await?;
    state
        .cache
        .set(cache_key, CachedLookup::Whois(record.clone()), CACHE_TTL);

    Ok(Json(record))
}

/// GET /external/geocode
pub async fn geocode(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<GeocodingResponse>> {
    let address = require_param(params.address, "address")?;

    let cache_key = format!("google_geocoding:{address}");
    if let Some(CachedLookup::Geocode(geocoding)) = state.cache.get(&cache_key) {
        debug!(address, "serving geocoding from cache");
        return Ok(Json(geocoding));
    }

    let geocoding = state.google.geocode(&address).await?;
    state.cache.set(
        cache_key,
        CachedLookup::Geocode(geocoding.clone()),
        CACHE_TTL,
    );

    Ok(Json(geocoding))
}

/// GET /external/geocode-geoapify
pub async fn geocode_geoapify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Response> {
    let address = require_param(params.address, "address")?;

    let cache_key = format!("geoapify_geocoding:{address}");
    if let Some(CachedLookup::Geoapify(data)) = state.cache.get(&cache_key) {
        debug!(address, "serving Geoapify geocoding from cache");
        return Ok(Json(data).into_response());
    }

    let data = state.geoapify.search(&address).await?;

    // An empty match still produces a body; serve it alongside the error
    // note instead of caching it.
    if data.features.is_empty() {
        return Ok(Json(serde_json::json!({
            "error": format!("no geocoding results found for address: {address}"),
            "data": data,
        }))
        .into_response());
    }

    state
        .cache
        .set(cache_key, CachedLookup::Geoapify(data.clone()), CACHE_TTL);

    Ok(Json(data).into_response())
}

/// GET /external/geocode-nominatim
pub async fn geocode_nominatim(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<Vec<NominatimResult>>> {
    let address = require_param(params.address, "address")?;

    let cache_key = format!("nominatim_geocoding:{address}");
    if let Some(CachedLookup::Nominatim(results)) = state.cache.get(&cache_key) {
        debug!(address, "serving Nominatim geocoding from cache");
        return Ok(Json(results));
    }

    let results = state.nominatim.search(&address).await?;
    if results.is_empty() {
        return Err(LookupError::NoResults(address).into());
    }

    state
        .cache
        .set(cache_key, CachedLookup::Nominatim(results.clone()), CACHE_TTL);

    Ok(Json(results))
}

fn geo_json(data: MapTilerResponse) -> Response {
    ([(header::CONTENT_TYPE, "application/geo+json")], Json(data)).into_response()
}

/// GET /external/geocode-maptiler
pub async fn geocode_maptiler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Response> {
    let address = require_param(params.address, "address")?;

    let cache_key = format!("maptiler_geocoding:{address}");
    if let Some(CachedLookup::MapTiler(data)) = state.cache.get(&cache_key) {
        debug!(address, "serving MapTiler geocoding from cache");
        return Ok(geo_json(data));
    }

    let mut data = state.maptiler.search(&address).await?;

    if data.features.is_empty() {
        return Ok(Json(serde_json::json!({
            "error": format!("no geocoding results found for address: {address}"),
            "data": data,
        }))
        .into_response());
    }

    // Keep the payload valid GeoJSON even when the upstream omits the type.
    if data.kind.is_empty() {
        data.kind = "FeatureCollection".into();
    }

    state
        .cache
        .set(cache_key, CachedLookup::MapTiler(data.clone()), CACHE_TTL);

    Ok(geo_json(data))
}

/// GET /external/autocomplete-address
pub async fn autocomplete_address(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AutocompleteQuery>,
) -> Result<Json<AutocompleteResponse>> {
    let query = require_param(params.q, "q")?;

    let cache_key = format!("address_autocomplete:{query}");
    if let Some(CachedLookup::Autocomplete(suggestions)) = state.cache.get(&cache_key) {
        debug!(query, "serving autocomplete from cache");
        return Ok(Json(suggestions));
    }

    let mut suggestions = state
        .places
        .autocomplete(&query, params.sessiontoken.as_deref())
        .await?;

    for prediction in &mut suggestions.predictions {
        prediction.description = abbreviate_state(&prediction.description);
    }

    state.cache.set(
        cache_key,
        CachedLookup::Autocomplete(suggestions.clone()),
        CACHE_TTL,
    );

    Ok(Json(suggestions))
}

/// POST /external/send-email
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<EmailResponse>> {
    if req.subject.is_empty()
        || req.body_html.is_empty()
        || req.sender.is_empty()
        || req.recipients.is_empty()
    {
        return Err(ApiError::bad_request("Missing required fields"));
    }
    if !is_valid_address(&req.sender) {
        return Err(ApiError::bad_request("Invalid sender email address"));
    }

    let message = EmailMessage {
        subject: req.subject,
        body_html: req.body_html,
        sender: req.sender,
        recipients: req.recipients,
    };

    let message_ids = state.mailer.send(&message).await?;

    Ok(Json(EmailResponse {
        message: "Emails sent successfully".into(),
        message_ids,
    }))
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = state.cache.stats();

    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        cache_entries: stats.total_entries,
        cache_valid_entries: stats.valid_entries,
        cache_expired_entries: stats.expired_entries,
    })
}
