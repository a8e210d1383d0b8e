//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use lookupd_core::LookupError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// Upstream provider failure.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message, "BAD_GATEWAY")
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match &err {
            LookupError::NoResults(_) => ApiError::not_found(err.to_string()),
            LookupError::InvalidEmailAddress(_) => ApiError::bad_request(err.to_string()),
            LookupError::HttpError(_)
            | LookupError::UpstreamStatus { .. }
            | LookupError::ProviderStatus { .. }
            | LookupError::JsonError(_) => ApiError::bad_gateway(err.to_string()),
            LookupError::MissingApiKey(_) | LookupError::ConfigError(_) => {
                tracing::error!(error = %err, "Gateway misconfigured");
                ApiError::internal(err.to_string())
            }
            LookupError::EmailDeliveryFailed => ApiError::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_mapping() {
        let err: ApiError = LookupError::NoResults("nowhere".into()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: ApiError = LookupError::MissingApiKey("Google").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let err: ApiError = LookupError::UpstreamStatus {
            provider: "Google",
            status: 500,
            body: String::new(),
        }
        .into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }
}
