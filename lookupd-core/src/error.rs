//! Error types for lookupd.
//!
//! All upstream-provider failures funnel into [`LookupError`] so handlers can
//! map them to HTTP responses in one place.

use thiserror::Error;

/// Result type alias using `LookupError`.
pub type Result<T> = std::result::Result<T, LookupError>;

/// Main error type for all lookup operations.
#[derive(Debug, Error)]
pub enum LookupError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A provider API key is not configured.
    #[error("{0} API key is not set")]
    MissingApiKey(&'static str),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request to an upstream provider failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Upstream provider answered with a non-success HTTP status.
    #[error("non-200 response from {provider} ({status}): {body}")]
    UpstreamStatus {
        /// Provider name.
        provider: &'static str,
        /// HTTP status code returned by the provider.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// Upstream provider answered 200 but flagged the request in its payload.
    #[error("{provider} API error: {status}")]
    ProviderStatus {
        /// Provider name.
        provider: &'static str,
        /// The status string from the provider's response body.
        status: String,
    },

    /// The provider returned an empty result set.
    #[error("no results found for query: {0}")]
    NoResults(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // EMAIL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A supplied email address is not syntactically valid.
    #[error("invalid email address: {0}")]
    InvalidEmailAddress(String),

    /// Delivery failed for every recipient.
    #[error("failed to send emails to any recipients")]
    EmailDeliveryFailed,

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl LookupError {
    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LookupError::HttpError(_) | LookupError::UpstreamStatus { .. }
        )
    }

    /// Returns true if the fault lies with the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LookupError::InvalidEmailAddress(_) | LookupError::NoResults(_)
        )
    }
}
