//! Leap client error types.

use thiserror::Error;

/// Result type for Leap API operations.
pub type LeapResult<T> = Result<T, LeapError>;

/// Errors that can occur while talking to the Leap API.
#[derive(Debug, Error)]
pub enum LeapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized ({0}): {1}")]
    Unauthorized(u16, String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Request failed ({0}): {1}")]
    RequestFailed(u16, String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl LeapError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => Self::Unauthorized(status, body),
            404 => Self::NotFound(body),
            // Retry-After is not parsed; assume one second.
            429 => Self::RateLimited(1000),
            500..=599 => Self::ServerError(status, body),
            _ => Self::RequestFailed(status, body),
        }
    }

    /// Check if error is transient.
    ///
    /// Anything else means repeating the same request cannot succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LeapError::Network(_) | LeapError::RateLimited(_) | LeapError::ServerError(_, _)
        )
    }
}
