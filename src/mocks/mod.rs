//! Mock implementations for testing.
//!
//! Provides a scripted transport and response fixtures for unit testing
//! without making real API calls.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use url::Url;

use crate::transport::{header_map, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// A recorded request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Full request URL.
    pub url: Url,
    /// Request body.
    pub body: Option<Vec<u8>>,
    /// Request headers.
    pub headers: HashMap<String, String>,
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Creates a successful JSON response.
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        Self::raw(200, serde_json::to_vec(value).unwrap_or_default())
    }

    /// Creates an error response in the service's error envelope.
    pub fn error(status: u16, message: &str) -> Self {
        let error = serde_json::json!({
            "error": {
                "code": status.to_string(),
                "message": message
            }
        });

        Self::raw(status, serde_json::to_vec(&error).unwrap_or_default())
    }

    /// Creates a response with an arbitrary body.
    pub fn raw(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }
}

/// Mock HTTP transport for testing.
///
/// Responses are served in the order they were queued; once the queue is
/// empty the default response is used, or a 500 if none is set.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<MockResponse, String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    default_response: Mutex<Option<MockResponse>>,
    delay: Mutex<Option<Duration>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        lock(&self.responses).push_back(Ok(response));
    }

    /// Queues a JSON response.
    pub fn queue_json<T: serde::Serialize>(&self, value: &T) {
        self.queue(MockResponse::json(value));
    }

    /// Queues a connection failure.
    pub fn queue_connection_error(&self, message: &str) {
        lock(&self.responses).push_back(Err(message.to_string()));
    }

    /// Sets the default response.
    pub fn set_default(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Delays every response by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn next_response(&self) -> Result<MockResponse, String> {
        lock(&self.responses).pop_front().unwrap_or_else(|| {
            Ok(lock(&self.default_response)
                .clone()
                .unwrap_or_else(|| MockResponse::error(500, "No mock response configured")))
        })
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        // Reject what the reqwest transport would reject.
        header_map(&request.headers)?;

        lock(&self.requests).push(RecordedRequest {
            url: request.url,
            body: request.body,
            headers: request.headers,
        });

        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_response() {
            Ok(response) => Ok(HttpResponse {
                status: response.status,
                body: response.body,
            }),
            Err(message) => Err(TransportError::Connection { message }),
        }
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .finish()
    }
}

/// Test fixtures for common response shapes.
pub mod fixtures {
    use serde_json::{json, Value};

    /// A prediction document with one intent and one entity.
    pub fn prediction(query: &str, top_intent: &str) -> Value {
        json!({
            "query": query,
            "prediction": {
                "topIntent": top_intent,
                "projectKind": "conversation",
                "intents": [
                    {"category": top_intent, "confidenceScore": 0.95},
                    {"category": "None", "confidenceScore": 0.05}
                ],
                "entities": [
                    {"category": "Room", "text": "kitchen", "offset": 12, "length": 7, "confidenceScore": 1.0}
                ]
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://contoso.example/language/:analyze-conversations").unwrap()
    }

    #[tokio::test]
    async fn test_mock_transport_queue() {
        let transport = MockTransport::new();
        transport.queue_json(&fixtures::prediction("hi", "Greet"));

        let response = transport.send(HttpRequest::post(url())).await.unwrap();

        assert_eq!(response.status, 200);
        assert!(response.text().contains("Greet"));
    }

    #[tokio::test]
    async fn test_mock_transport_records_requests() {
        let transport = MockTransport::new();
        transport.set_default(MockResponse::json(&serde_json::json!({})));

        transport
            .send(HttpRequest::post(url()).with_body(b"{}".to_vec()))
            .await
            .unwrap();
        transport
            .send(HttpRequest::post(url()).with_header("x-trace", "1"))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body.as_deref(), Some(&b"{}"[..]));
        assert_eq!(requests[1].body, None);
        assert_eq!(requests[1].headers.get("x-trace").map(String::as_str), Some("1"));
    }

    #[tokio::test]
    async fn test_mock_transport_unconfigured_is_500() {
        let transport = MockTransport::new();
        let response = transport.send(HttpRequest::post(url())).await.unwrap();
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn test_mock_transport_connection_error() {
        let transport = MockTransport::new();
        transport.queue_connection_error("refused");

        let result = transport.send(HttpRequest::post(url())).await;
        assert!(matches!(result, Err(TransportError::Connection { .. })));
    }

    #[tokio::test]
    async fn test_mock_transport_rejects_invalid_header() {
        let transport = MockTransport::new();
        let result = transport
            .send(HttpRequest::post(url()).with_header("x-bad", "a\nb"))
            .await;

        assert!(matches!(result, Err(TransportError::InvalidRequest { .. })));
        assert_eq!(transport.request_count(), 0);
    }
}
