//! Integration tests for predictions

use super::*;
use clu_client::auth::SUBSCRIPTION_KEY_HEADER;
use clu_client::{CancellationToken, CluError};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn prediction_body() -> serde_json::Value {
    json!({
        "query": "turn on the kitchen lights",
        "prediction": {
            "topIntent": "TurnOn",
            "projectKind": "conversation",
            "intents": [{"category": "TurnOn", "confidenceScore": 0.97}],
            "entities": [{"category": "Room", "text": "kitchen", "offset": 12, "length": 7}]
        }
    })
}

#[tokio::test]
async fn test_prediction_integration_success() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path(PREDICTION_PATH))
        .and(query_param("projectName", "HomeAutomation"))
        .and(query_param("deploymentName", "production"))
        .and(query_param("api-version", "2022-05-01"))
        .and(header(SUBSCRIPTION_KEY_HEADER, TEST_KEY))
        .and(body_json(json!({"query": "turn on the kitchen lights"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(prediction_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_builder(&mock_server)
        .build()
        .expect("Failed to build client");

    let prediction = client
        .predict("turn on the kitchen lights", &CancellationToken::new())
        .await
        .expect("prediction should succeed");

    assert_eq!(prediction.into_value(), prediction_body());
}

#[tokio::test]
async fn test_prediction_integration_optional_fields() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path(PREDICTION_PATH))
        .and(body_json(json!({
            "query": "hola",
            "verbose": true,
            "language": "es",
            "isLoggingEnabled": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prediction": {}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_builder(&mock_server)
        .verbose(true)
        .language("es")
        .logging_enabled(false)
        .build()
        .expect("Failed to build client");

    let result = client.predict("hola", &CancellationToken::new()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_prediction_integration_unauthorized() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path(PREDICTION_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "code": "401",
                "message": "Access denied due to invalid subscription key or wrong API endpoint."
            }
        })))
        .mount(&mock_server)
        .await;

    let client = client_builder(&mock_server)
        .build()
        .expect("Failed to build client");

    let error = client
        .predict("hi", &CancellationToken::new())
        .await
        .expect_err("401 must fail");

    assert!(error.is_transport());
    assert_eq!(error.status_code(), Some(401));
    match error {
        CluError::Transport { body, .. } => {
            assert!(body.unwrap_or_default().contains("Access denied"));
        }
        other => panic!("Expected Transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_prediction_integration_server_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_builder(&mock_server)
        .build()
        .expect("Failed to build client");

    let error = client
        .predict("hi", &CancellationToken::new())
        .await
        .expect_err("503 must fail");

    assert_eq!(error.status_code(), Some(503));
    assert_eq!(client.metrics().failed_requests, 1);
}

#[tokio::test]
async fn test_prediction_integration_malformed_body() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&mock_server)
        .await;

    let client = client_builder(&mock_server)
        .build()
        .expect("Failed to build client");

    let error = client
        .predict("hi", &CancellationToken::new())
        .await
        .expect_err("HTML body must fail");

    assert!(matches!(error, CluError::Parse { .. }));
}

#[tokio::test]
async fn test_prediction_integration_timeout() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(prediction_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let client = client_builder(&mock_server)
        .timeout(Duration::from_millis(200))
        .build()
        .expect("Failed to build client");

    let error = client
        .predict("hi", &CancellationToken::new())
        .await
        .expect_err("slow response must time out");

    assert!(matches!(error, CluError::Timeout { .. }));
}

#[tokio::test]
async fn test_prediction_integration_cancelled() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(prediction_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let client = client_builder(&mock_server)
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build client");

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let error = client
        .predict("hi", &cancel)
        .await
        .expect_err("cancelled call must fail");

    assert!(matches!(error, CluError::Cancelled));
}

#[tokio::test]
async fn test_prediction_integration_custom_header() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(header("x-ms-client-tag", "integration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_builder(&mock_server)
        .header("x-ms-client-tag", "integration")
        .build()
        .expect("Failed to build client");

    assert!(client.predict("hi", &CancellationToken::new()).await.is_ok());
}

#[tokio::test]
async fn test_prediction_integration_reserved_headers_sent_once() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_builder(&mock_server)
        .header("ocp-apim-subscription-key", "stale-key")
        .header("CONTENT-TYPE", "text/plain")
        .build()
        .expect("Failed to build client");

    assert!(client.predict("hi", &CancellationToken::new()).await.is_ok());

    let requests = mock_server
        .received_requests()
        .await
        .expect("Request recording is enabled");
    assert_eq!(requests.len(), 1);

    let headers = &requests[0].headers;
    let keys: Vec<_> = headers.get_all(SUBSCRIPTION_KEY_HEADER).iter().collect();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].to_str().unwrap(), TEST_KEY);

    let content_types: Vec<_> = headers.get_all("content-type").iter().collect();
    assert_eq!(content_types.len(), 1);
    assert_eq!(
        content_types[0].to_str().unwrap(),
        "application/json; charset=utf-8"
    );
}

#[tokio::test]
async fn test_prediction_integration_invalid_header_rejected_at_build() {
    let mock_server = setup_mock_server().await;

    let result = client_builder(&mock_server)
        .header("x-ms-client-tag", "line\nbreak")
        .build();

    assert!(matches!(result, Err(CluError::Configuration { .. })));
    assert!(mock_server.received_requests().await.unwrap_or_default().is_empty());
}
