//! Prediction request and response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::CluConfig;
use crate::errors::{CluError, CluResult};

/// Body of a prediction request.
///
/// Only `query` is always present; the optional flags are serialized only
/// when they are set in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    /// The utterance to analyze.
    pub query: String,
    /// Return verbose results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    /// Language of the utterance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Allow the service to log the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_logging_enabled: Option<bool>,
}

impl PredictionRequest {
    /// Creates a request carrying only the utterance.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            verbose: None,
            language: None,
            is_logging_enabled: None,
        }
    }

    /// Creates a request with the optional flags taken from configuration.
    pub fn from_config(query: impl Into<String>, config: &CluConfig) -> Self {
        Self {
            query: query.into(),
            verbose: config.verbose,
            language: config.language.clone(),
            is_logging_enabled: config.is_logging_enabled,
        }
    }

    /// Serializes the request to JSON bytes.
    pub fn to_json(&self) -> CluResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Prediction result, kept exactly as returned by the service.
///
/// Nothing in the document is validated. The accessors are lookups that
/// return `None` when the expected shape is not there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionResponse(Map<String, Value>);

impl PredictionResponse {
    /// Parses a response body, which must be a JSON object.
    pub fn from_slice(body: &[u8]) -> CluResult<Self> {
        match serde_json::from_slice::<Value>(body)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CluError::parse(format!(
                "Expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Returns a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up a value by JSON pointer, e.g. `/prediction/topIntent`.
    ///
    /// Unlike [`Value::pointer`], the empty pointer `""` returns `None`
    /// rather than the whole document, because the root is an object and not
    /// a `Value`. Use [`as_map`](Self::as_map) for the root.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let path = pointer.strip_prefix('/')?;
        let (head, rest) = match path.find('/') {
            Some(idx) => path.split_at(idx),
            None => (path, ""),
        };
        let value = self.0.get(&head.replace("~1", "/").replace("~0", "~"))?;
        if rest.is_empty() {
            Some(value)
        } else {
            value.pointer(rest)
        }
    }

    /// Returns the top intent, looking under `prediction` and then
    /// `result.prediction`.
    pub fn top_intent(&self) -> Option<&str> {
        self.pointer("/prediction/topIntent")
            .or_else(|| self.pointer("/result/prediction/topIntent"))
            .and_then(Value::as_str)
    }

    /// Returns the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the response, returning the JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Consumes the response, returning it as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for PredictionResponse {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config() -> crate::config::CluConfigBuilder {
        CluConfig::builder()
            .endpoint("https://contoso.cognitiveservices.azure.com")
            .endpoint_key("0123456789abcdef")
            .project_name("HomeAutomation")
            .deployment_name("production")
    }

    #[test]
    fn test_request_omits_unset_fields() {
        let config = config().build().unwrap();
        let request = PredictionRequest::from_config("turn on the lights", &config);

        let body = String::from_utf8(request.to_json().unwrap()).unwrap();
        assert_eq!(body, r#"{"query":"turn on the lights"}"#);
    }

    #[test]
    fn test_request_includes_set_fields_in_order() {
        let config = config()
            .verbose(true)
            .language("en-us")
            .logging_enabled(false)
            .build()
            .unwrap();
        let request = PredictionRequest::from_config("hi", &config);

        let body = String::from_utf8(request.to_json().unwrap()).unwrap();
        assert_eq!(
            body,
            r#"{"query":"hi","verbose":true,"language":"en-us","isLoggingEnabled":false}"#
        );
    }

    #[test]
    fn test_request_partial_fields() {
        let config = config().language("fr").build().unwrap();
        let value = serde_json::to_value(PredictionRequest::from_config("bonjour", &config)).unwrap();

        assert_eq!(value, json!({"query": "bonjour", "language": "fr"}));
        assert!(value.get("verbose").is_none());
        assert!(value.get("isLoggingEnabled").is_none());
    }

    #[test]
    fn test_empty_utterance_is_sent() {
        let value = serde_json::to_value(PredictionRequest::new("")).unwrap();
        assert_eq!(value, json!({"query": ""}));
    }

    #[test]
    fn test_response_is_kept_verbatim() {
        let raw = json!({
            "query": "turn on the lights",
            "prediction": {
                "topIntent": "TurnOn",
                "projectKind": "conversation",
                "intents": [{"category": "TurnOn", "confidenceScore": 0.97}],
                "entities": []
            },
            "unknownField": [1, 2, 3]
        });
        let body = serde_json::to_vec(&raw).unwrap();

        let response = PredictionResponse::from_slice(&body).unwrap();
        assert_eq!(response.clone().into_value(), raw);
        assert_eq!(response.top_intent(), Some("TurnOn"));
        assert_eq!(response.get("unknownField"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_top_intent_nested_under_result() {
        let response: PredictionResponse = serde_json::from_value(json!({
            "kind": "ConversationResult",
            "result": {"prediction": {"topIntent": "Book"}}
        }))
        .unwrap();

        assert_eq!(response.top_intent(), Some("Book"));
        assert_eq!(
            response.pointer("/result/prediction/topIntent"),
            Some(&json!("Book"))
        );
    }

    #[test]
    fn test_accessors_tolerate_missing_shape() {
        let response: PredictionResponse = serde_json::from_value(json!({"prediction": 5})).unwrap();

        assert_eq!(response.top_intent(), None);
        assert_eq!(response.pointer("/nothing/here"), None);
        assert_eq!(response.pointer(""), None);
    }

    #[test]
    fn test_non_object_body_is_parse_error() {
        let result = PredictionResponse::from_slice(b"[1, 2]");
        match result {
            Err(CluError::Parse { message }) => assert!(message.contains("array")),
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = PredictionResponse::from_slice(b"<html>oops</html>");
        assert!(matches!(result, Err(CluError::Parse { .. })));
    }

    #[test]
    fn test_empty_pointer_is_none_and_root_is_the_map() {
        let response = PredictionResponse::from_slice(br#"{"query":"hi"}"#).unwrap();

        assert_eq!(response.pointer(""), None);
        assert_eq!(response.pointer("/"), None);
        assert_eq!(response.as_map().get("query"), Some(&json!("hi")));
    }

    #[test]
    fn test_response_keeps_service_key_order() {
        let body = br#"{"query":"hi","prediction":{"topIntent":"Greet","intents":[],"entities":[]},"kind":"ConversationResult"}"#;
        let response = PredictionResponse::from_slice(body).unwrap();

        let keys: Vec<&str> = response.as_map().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["query", "prediction", "kind"]);
        assert_eq!(serde_json::to_vec(&response).unwrap(), body.to_vec());
    }
}
