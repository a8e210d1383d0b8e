//! App state: provider clients, the shared cache, config.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use lookupd_cache::{SweeperHandle, TtlCache, DEFAULT_SWEEP_INTERVAL};
use lookupd_providers::{
    GeoapifyClient, GeoapifyConfig, GeocodingClient, GeocodingConfig, MailerClient, MailerConfig,
    MapTilerClient, MapTilerConfig, NominatimClient, NominatimConfig, PlacesClient, PlacesConfig,
    WhoisClient, WhoisConfig,
};

use crate::dto::CachedLookup;

/// Gateway configuration: one section per upstream provider plus cache
/// tuning.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// WHOIS provider settings
    pub whois: WhoisConfig,
    /// Google Geocoding settings
    pub google: GeocodingConfig,
    /// Geoapify settings
    pub geoapify: GeoapifyConfig,
    /// MapTiler settings
    pub maptiler: MapTilerConfig,
    /// Nominatim settings
    pub nominatim: NominatimConfig,
    /// Places Autocomplete settings (shares the Google key)
    pub places: PlacesConfig,
    /// MailerSend settings
    pub mailer: MailerConfig,
    /// How often the cache sweep runs
    pub sweep_interval: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            whois: WhoisConfig::default(),
            google: GeocodingConfig::default(),
            geoapify: GeoapifyConfig::default(),
            maptiler: MapTilerConfig::default(),
            nominatim: NominatimConfig::default(),
            places: PlacesConfig::default(),
            mailer: MailerConfig::default(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl ApiConfig {
    /// Builds the configuration from the environment (and `.env`, when
    /// present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        config.whois.api_key = std::env::var("JSONWHOIS_APIKEY").ok();
        let google_key = std::env::var("GOOGLE_API_KEY").ok();
        config.google.api_key = google_key.clone();
        config.places.api_key = google_key;
        config.geoapify.api_key = std::env::var("GEOAPIFY_API_KEY").ok();
        config.maptiler.api_key = std::env::var("MAPTILER_API_KEY").ok();
        config.mailer.api_key = std::env::var("MAILERSEND_API_KEY").ok();

        if let Some(seconds) = std::env::var("CACHE_SWEEP_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.sweep_interval = Duration::from_secs(seconds);
        }

        config
    }
}

/// Shared state behind every handler.
///
/// Owns the process-wide cache instance and the provider clients; created
/// once at startup by the composition root and passed around in an `Arc`.
pub struct AppState {
    /// Gateway configuration
    pub config: ApiConfig,
    /// The shared TTL cache all lookup handlers write through
    pub cache: Arc<TtlCache<CachedLookup>>,
    /// WHOIS client
    pub whois: WhoisClient,
    /// Google Geocoding client
    pub google: GeocodingClient,
    /// Geoapify client
    pub geoapify: GeoapifyClient,
    /// MapTiler client
    pub maptiler: MapTilerClient,
    /// Nominatim client
    pub nominatim: NominatimClient,
    /// Places Autocomplete client
    pub places: PlacesClient,
    /// MailerSend client
    pub mailer: MailerClient,
    /// When this state was built; the health endpoint reports uptime from it
    pub started_at: Instant,
    // Keeps the sweep task alive for the lifetime of the state; dropping the
    // state stops it.
    _sweeper: SweeperHandle,
}

impl AppState {
    /// Builds the state and spawns the cache sweep task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: ApiConfig) -> Self {
        let cache = Arc::new(TtlCache::new());
        let sweeper = cache.spawn_sweeper(config.sweep_interval);

        Self {
            whois: WhoisClient::with_config(config.whois.clone()),
            google: GeocodingClient::with_config(config.google.clone()),
            geoapify: GeoapifyClient::with_config(config.geoapify.clone()),
            maptiler: MapTilerClient::with_config(config.maptiler.clone()),
            nominatim: NominatimClient::with_config(config.nominatim.clone()),
            places: PlacesClient::with_config(config.places.clone()),
            mailer: MailerClient::with_config(config.mailer.clone()),
            cache,
            config,
            started_at: Instant::now(),
            _sweeper: sweeper,
        }
    }
}
