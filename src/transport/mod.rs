//! HTTP transport layer for the CLU client.
//!
//! Provides the HTTP transport abstraction and the reqwest-backed
//! implementation used by default.

mod http;

pub use http::{HttpRequest, HttpResponse, HttpTransport, HttpTransportImpl};
pub(crate) use http::header_map;

use std::time::Duration;

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration.
        timeout: Duration,
    },

    /// The request could not be built (bad header name or value).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// Invalid response.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}
