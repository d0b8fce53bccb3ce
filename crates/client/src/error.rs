//! Error types for the storefront API client.

use thiserror::Error;

/// Result type alias for API client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by the request layer.
///
/// An `Api` error means the server answered with a non-success status; the
/// call performed no retries and mutated nothing locally. Authoritative
/// state is always re-derived by re-reading the basket.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport error (no usable response)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response from the API
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

impl ApiError {
    /// Create an API error from status, optional structured code and message.
    pub fn api(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
        }
    }

    /// HTTP status if the server produced a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured rejection code, when the backend provided one.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Server-provided message for API rejections.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}
