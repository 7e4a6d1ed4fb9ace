//! API Client Error Types
//!
//! Errors raised while talking to the backend. Loaders and controllers never
//! let these escape; they are converted into per-feature state flags or
//! transient messages.

use thiserror::Error;

/// Errors that can occur when communicating with the backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure reported by the HTTP client
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request did not complete in time
    #[error("Request timeout")]
    Timeout,

    /// The backend could not be reached
    #[error("Backend unavailable")]
    Unavailable,

    /// The backend answered with a non-success status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not the expected JSON
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// No CSRF token could be obtained from cookie or token endpoint
    #[error("missing-csrf-token")]
    MissingCsrfToken,

    /// The configured base URL or a derived endpoint URL is invalid
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status of the failed request, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the backend rejected the request as unauthenticated
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Classify a transport error the same way for every endpoint
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Unavailable
        } else {
            ApiError::Request(err)
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Result type alias for backend calls
pub type ApiResult<T> = Result<T, ApiError>;
