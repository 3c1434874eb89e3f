//! Trace records for diagnostics.
//!
//! A trace pairs one prediction with the options that produced it, in a
//! shape a bot framework can attach to a trace activity. The subscription
//! key is never part of a trace.

use serde::{Deserialize, Serialize};

use super::prediction::PredictionResponse;
use crate::config::CluConfig;

/// Value type of a LUIS trace activity.
pub const LUIS_TRACE_TYPE: &str = "https://www.luis.ai/schemas/trace";

/// Options recorded in a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceOptions {
    /// Resource endpoint.
    pub endpoint: String,
    /// Project name.
    pub project_name: String,
    /// Deployment name.
    pub deployment_name: String,
    /// API version.
    pub api_version: String,
    /// Utterance language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Verbose flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    /// Service-side logging flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_logging_enabled: Option<bool>,
}

impl From<&CluConfig> for TraceOptions {
    fn from(config: &CluConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            project_name: config.project_name.clone(),
            deployment_name: config.deployment_name.clone(),
            api_version: config.api_version.clone(),
            language: config.language.clone(),
            verbose: config.verbose,
            is_logging_enabled: config.is_logging_enabled,
        }
    }
}

/// Trace of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionTrace {
    /// Trace value type, always [`LUIS_TRACE_TYPE`].
    pub value_type: String,
    /// The utterance that was analyzed.
    pub query: String,
    /// Options in effect for the call.
    pub options: TraceOptions,
    /// Raw prediction.
    pub prediction: PredictionResponse,
}

impl PredictionTrace {
    /// Creates a trace for a prediction made with `config`.
    pub fn new(
        config: &CluConfig,
        query: impl Into<String>,
        prediction: PredictionResponse,
    ) -> Self {
        Self {
            value_type: LUIS_TRACE_TYPE.to_string(),
            query: query.into(),
            options: TraceOptions::from(config),
            prediction,
        }
    }
}
