//! HTTP transport implementation.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder};
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;
use url::Url;

use super::TransportError;

/// A POST request to the prediction endpoint.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Absolute request URL, query string included.
    pub url: Url,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a new POST request.
    pub fn post(url: Url) -> Self {
        Self {
            url,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// HTTP response representation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true if the status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP transport trait.
///
/// Implementations must be safe to share between tasks; one transport
/// serves every request a client makes.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a POST request.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Converts request headers into a `HeaderMap`.
///
/// Names are case-insensitive: a later entry with the same name replaces an
/// earlier one instead of adding a second header line.
pub(crate) fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            TransportError::InvalidRequest {
                message: format!("invalid header name {:?}: {}", name, e),
            }
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| TransportError::InvalidRequest {
            message: format!("invalid value for header {}: {}", name, e),
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransportImpl {
    client: Client,
    timeout: Duration,
}

impl HttpTransportImpl {
    /// Creates a new HTTP transport with a deadline for every request.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| TransportError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl HttpTransport for HttpTransportImpl {
    #[instrument(skip(self, request), fields(path = %request.url.path()))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = self.timeout;
        let headers = header_map(&request.headers)?;

        let mut req_builder = self.client.post(request.url).headers(headers);

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout { timeout }
            } else if e.is_connect() {
                TransportError::Connection {
                    message: e.to_string(),
                }
            } else {
                TransportError::InvalidResponse {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout { timeout }
                } else {
                    TransportError::InvalidResponse {
                        message: e.to_string(),
                    }
                }
            })?
            .to_vec();

        Ok(HttpResponse { status, body })
    }
}

impl std::fmt::Debug for HttpTransportImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportImpl")
            .field("timeout", &self.timeout)
            .finish()
    }
}
