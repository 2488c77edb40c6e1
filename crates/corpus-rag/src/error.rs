//! Error types for the corpus manager

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for corpus operations
pub type Result<T> = std::result::Result<T, Error>;

/// Corpus manager errors
///
/// Validation variants (`InvalidArgument`, `PayloadTooLarge`,
/// `UnsupportedType`) are raised before any network call is made.
/// The remaining variants wrap service-originated failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed local input, rejected before reaching the service
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Upload exceeds the client-side size limit
    #[error("Payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// Mime type not in the supported upload set
    #[error("Unsupported mime type: {0}")]
    UnsupportedType(String),

    /// Account-level limit reached (e.g. maximum store count)
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Unknown store or document id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transient network or service failure, retryable by the caller
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// External call exceeded its deadline
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The service responded but generation could not complete
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a service unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Create a generation failed error
    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::GenerationFailed(message.into())
    }

    /// True for failures the caller may retry as-is
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_) | Self::Timeout(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else {
            Error::ServiceUnavailable(err.to_string())
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::InvalidArgument(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_argument", msg.clone())
            }
            Error::PayloadTooLarge { size, limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                format!("Payload of {} bytes exceeds limit of {} bytes", size, limit),
            ),
            Error::UnsupportedType(mime) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_type",
                format!("Unsupported mime type: {}", mime),
            ),
            Error::QuotaExceeded(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "quota_exceeded", msg.clone())
            }
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Error::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
            ),
            Error::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "timeout", msg.clone()),
            Error::GenerationFailed(msg) => {
                (StatusCode::BAD_GATEWAY, "generation_failed", msg.clone())
            }
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error", msg.clone()),
            Error::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error", err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(Error::service_unavailable("listing failed").is_retryable());
        assert!(Error::Timeout("deadline".into()).is_retryable());
        assert!(!Error::invalid_argument("bad input").is_retryable());
        assert!(!Error::QuotaExceeded("10 stores".into()).is_retryable());
    }
}
