//! # lookupd API Server
//!
//! HTTP gateway proxying third-party lookup services behind a shared
//! in-memory TTL cache.
//!
//! ## Endpoints
//!
//! - `GET /external/whois/:domain` - WHOIS record for a domain
//! - `GET /external/geocode?address=` - Google geocoding
//! - `GET /external/geocode-geoapify?address=` - Geoapify geocoding
//! - `GET /external/geocode-nominatim?address=` - Nominatim geocoding
//! - `GET /external/geocode-maptiler?address=` - MapTiler geocoding
//! - `GET /external/autocomplete-address?q=` - Address autocompletion
//! - `POST /external/send-email` - Transactional email
//!
//! ## Example
//!
//! ```rust,ignore
//! use lookupd_api::{ApiServer, ApiConfig};
//!
//! let config = ApiConfig::from_env();
//! let server = ApiServer::new(config);
//! server.run(([0, 0, 0, 0], 8080)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use dto::{CachedLookup, EmailRequest, EmailResponse, HealthResponse};
pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// API server for the lookupd gateway.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    ///
    /// Must be called from within a tokio runtime: the shared cache's sweep
    /// task is spawned here and lives as long as the server state.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(config)),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("lookupd API server listening on {}", addr);

        axum::serve(listener, self.router()).await
    }
}
