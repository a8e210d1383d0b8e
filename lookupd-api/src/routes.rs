//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Landing + health check
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Lookup proxies
        .route("/external/whois/:domain", get(handlers::whois))
        .route(
            "/external/autocomplete-address",
            get(handlers::autocomplete_address),
        )
        .route("/external/geocode", get(handlers::geocode))
        .route("/external/geocode-geoapify", get(handlers::geocode_geoapify))
        .route(
            "/external/geocode-nominatim",
            get(handlers::geocode_nominatim),
        )
        .route(
            "/external/geocode-maptiler",
            get(handlers::geocode_maptiler),
        )
        // Email
        .route("/external/send-email", post(handlers::send_email))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::dto::CachedLookup;
    use crate::state::ApiConfig;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(ApiConfig::default()))
    }

    async fn get_status(app: Router, uri: &str) -> StatusCode {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(test_state());
        assert_eq!(get_status(app, "/health").await, StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_reports_uptime_and_cache_stats() {
        let state = test_state();
        state.cache.set(
            "whois:short.com",
            CachedLookup::Whois(lookupd_providers::WhoisRecord::new()),
            Duration::from_secs(10),
        );
        state.cache.set(
            "whois:forever.com",
            CachedLookup::Whois(lookupd_providers::WhoisRecord::new()),
            Duration::ZERO,
        );

        // Past the first deadline, before any sweep tick.
        tokio::time::advance(Duration::from_secs(42)).await;

        let app = create_router(state);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        // Uptime counts from state construction, not from the first probe.
        assert_eq!(body["uptime_seconds"], 42);
        assert_eq!(body["cache_entries"], 2);
        assert_eq!(body["cache_valid_entries"], 1);
        assert_eq!(body["cache_expired_entries"], 1);
    }

    #[tokio::test]
    async fn test_root() {
        let app = create_router(test_state());
        assert_eq!(get_status(app, "/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_geocode_requires_address() {
        let app = create_router(test_state());
        assert_eq!(
            get_status(app.clone(), "/external/geocode").await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(app, "/external/geocode?address=").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_autocomplete_requires_query() {
        let app = create_router(test_state());
        assert_eq!(
            get_status(app, "/external/autocomplete-address").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_send_email_rejects_missing_fields() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/external/send-email")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_send_email_rejects_invalid_sender() {
        let app = create_router(test_state());
        let body = serde_json::json!({
            "subject": "hi",
            "body_html": "<p>hi</p>",
            "sender": "not-an-address",
            "recipients": ["user@example.com"]
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/external/send-email")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_geocode_write_through_hits_upstream_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [],
                "status": "OK"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = ApiConfig::default();
        config.google.base_url = server.uri();
        config.google.api_key = Some("key".into());
        let state = Arc::new(AppState::new(config));
        let app = create_router(state.clone());

        // Second identical request is served from the cache; the mock's
        // expect(1) verifies no second upstream call happens.
        for _ in 0..2 {
            let status =
                get_status(app.clone(), "/external/geocode?address=1600+Amphitheatre").await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(state.cache.len(), 1);
        assert!(state
            .cache
            .get("google_geocoding:1600 Amphitheatre")
            .is_some());
    }

    #[tokio::test]
    async fn test_whois_cache_hit_skips_upstream() {
        // No mock server at all: a seeded cache entry must fully answer the
        // request.
        let state = test_state();
        let mut record = lookupd_providers::WhoisRecord::new();
        record.insert("Registrar".into(), serde_json::Value::String("Example".into()));
        state.cache.set(
            "whois:example.com",
            CachedLookup::Whois(record),
            Duration::from_secs(60),
        );

        let app = create_router(state);
        assert_eq!(
            get_status(app, "/external/whois/example.com").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let mut config = ApiConfig::default();
        config.google.base_url = server.uri();
        config.google.api_key = Some("key".into());
        let app = create_router(Arc::new(AppState::new(config)));

        assert_eq!(
            get_status(app, "/external/geocode?address=somewhere").await,
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_missing_api_key_maps_to_internal_error() {
        let app = create_router(test_state());
        assert_eq!(
            get_status(app, "/external/geocode?address=somewhere").await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
