//! Error types for the CLU client.
//!
//! A prediction call fails in one of two ways at runtime: the transport did
//! not deliver a successful response, or the response body could not be
//! read as a JSON object. Configuration and cancellation are reported
//! through the same enum.

use std::time::Duration;
use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for CLU operations.
pub type CluResult<T> = Result<T, CluError>;

/// Error type for CLU client operations.
#[derive(Debug, Error)]
pub enum CluError {
    /// Configuration error (missing key, malformed endpoint, etc.)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// Transport error: the request could not be completed, or the service
    /// answered with a non-success status.
    #[error("Transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Raw response body, when a response was received.
        body: Option<String>,
    },

    /// The request deadline elapsed.
    #[error("Request timeout after {timeout:?}")]
    Timeout {
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// The response body was not a JSON object.
    #[error("Parse error: {message}")]
    Parse {
        /// Error message.
        message: String,
    },

    /// The caller cancelled the request.
    #[error("Request cancelled")]
    Cancelled,
}

impl CluError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        CluError::Configuration {
            message: message.into(),
        }
    }

    /// Creates a transport error for a non-success HTTP status.
    pub fn status(status: u16, body: Option<String>) -> Self {
        CluError::Transport {
            message: format!("Response status code does not indicate success: {}", status),
            status: Some(status),
            body,
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        CluError::Parse {
            message: message.into(),
        }
    }

    /// Returns true if the failure happened at the transport level
    /// (including timeouts and non-success statuses).
    pub fn is_transport(&self) -> bool {
        matches!(self, CluError::Transport { .. } | CluError::Timeout { .. })
    }

    /// Returns the HTTP status code, if the error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CluError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Short, stable label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CluError::Configuration { .. } => "configuration",
            CluError::Transport { status: Some(_), .. } => "http_status",
            CluError::Transport { status: None, .. } => "transport",
            CluError::Timeout { .. } => "timeout",
            CluError::Parse { .. } => "parse",
            CluError::Cancelled => "cancelled",
        }
    }
}

impl From<TransportError> for CluError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout { timeout } => CluError::Timeout { timeout },
            other => CluError::Transport {
                message: other.to_string(),
                status: None,
                body: None,
            },
        }
    }
}

impl From<serde_json::Error> for CluError {
    fn from(err: serde_json::Error) -> Self {
        CluError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for CluError {
    fn from(err: url::ParseError) -> Self {
        CluError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
