//! # Client Error Types
//!
//! Errors raised while talking to the remote shipping API.

use thiserror::Error;

/// Client operation result type
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// The API answered 2xx but reported `success: false`
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Invalid response: {field} - {reason}")]
    InvalidResponse { field: String, reason: String },
}

impl ClientError {
    /// Create an API error from HTTP response
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Create an invalid response error for protocol violations
    pub fn invalid_response(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the same request could succeed if the operator tries again.
    /// Nothing in this crate retries on its own.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClientError::HttpError(e) => e.is_timeout() || e.is_connect(),
            ClientError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status of an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ApiError { status, .. } => Some(*status),
            ClientError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
