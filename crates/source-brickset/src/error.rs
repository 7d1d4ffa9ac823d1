//! Error types for the Brickset API integration.

use thiserror::Error;

/// Errors that can occur when talking to the Brickset API.
#[derive(Debug, Error)]
pub enum BricksetError {
    /// API reported a non-success status.
    #[error("API error: {0}")]
    Api(String),

    /// HTTP-level failure.
    #[error("HTTP error: {status_code}")]
    Http {
        /// HTTP status code.
        status_code: u16,
    },

    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Request timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl BricksetError {
    /// Returns true if the request should be retried later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Http { status_code } => *status_code >= 500 || *status_code == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for BricksetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BricksetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for Brickset operations.
pub type Result<T> = std::result::Result<T, BricksetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_and_throttle_errors_are_transient() {
        assert!(BricksetError::Http { status_code: 500 }.is_transient());
        assert!(BricksetError::Http { status_code: 429 }.is_transient());
        assert!(!BricksetError::Http { status_code: 404 }.is_transient());
    }

    #[test]
    fn test_api_error_is_not_transient() {
        let err = BricksetError::Api("invalid API key".to_string());
        assert!(!err.is_transient());
        assert!(err.to_string().contains("invalid API key"));
    }
}
