//! Integration tests using WireMock
//!
//! These tests run the complete request/response cycle against a mock HTTP
//! server: URL and query construction, the subscription key header, body
//! serialization, and error handling.

mod prediction;

use clu_client::{CluClient, CluClientBuilder};
use wiremock::MockServer;

/// Test subscription key (not a real key).
pub const TEST_KEY: &str = "test-subscription-key";

/// Path the prediction endpoint is served under.
pub const PREDICTION_PATH: &str = "/language/:analyze-conversations";

/// Helper to create a mock server.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Builder pointed at the mock server with the common identifiers set.
pub fn client_builder(server: &MockServer) -> CluClientBuilder {
    CluClient::builder()
        .endpoint(server.uri())
        .endpoint_key(TEST_KEY)
        .project_name("HomeAutomation")
        .deployment_name("production")
        .api_version("2022-05-01")
}
