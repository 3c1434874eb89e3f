//! Prediction service.

use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::auth::AuthProvider;
use crate::config::CluConfig;
use crate::errors::{CluError, CluResult};
use crate::observability::{log_error, log_request, log_response, MetricsCollector, RequestTimer};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

const CONTENT_TYPE: &str = "Content-Type";
use crate::types::prediction::{PredictionRequest, PredictionResponse};

/// Prediction service: one POST per utterance, no retries.
pub struct PredictionService {
    config: Arc<CluConfig>,
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
    metrics: Arc<dyn MetricsCollector>,
}

impl PredictionService {
    /// Creates a new prediction service.
    pub fn new(
        config: Arc<CluConfig>,
        transport: Arc<dyn HttpTransport>,
        auth: Arc<dyn AuthProvider>,
        metrics: Arc<dyn MetricsCollector>,
    ) -> Self {
        Self {
            config,
            transport,
            auth,
            metrics,
        }
    }

    /// Submits an utterance and returns the prediction document.
    ///
    /// The call is abandoned as soon as `cancel` fires, and fails with
    /// [`CluError::Timeout`] once the configured deadline elapses.
    ///
    /// # Errors
    ///
    /// - [`CluError::Transport`] when the request fails or the status is not 2xx
    /// - [`CluError::Parse`] when the body is not a JSON object
    /// - [`CluError::Cancelled`] when `cancel` fires first
    #[instrument(
        skip(self, utterance, cancel),
        fields(
            project = %self.config.project_name,
            deployment = %self.config.deployment_name,
        )
    )]
    pub async fn predict(
        &self,
        utterance: &str,
        cancel: &CancellationToken,
    ) -> CluResult<PredictionResponse> {
        let timer = RequestTimer::start("predict");
        let result = self.execute(utterance, cancel, &timer).await;

        match &result {
            Ok(prediction) => {
                self.metrics.record_request(true, timer.elapsed());
                if let Some(intent) = prediction.top_intent() {
                    self.metrics.record_intent(intent);
                }
                tracing::debug!(
                    operation = timer.operation(),
                    duration_ms = timer.elapsed_ms(),
                    top_intent = prediction.top_intent().unwrap_or("<none>"),
                    "Prediction completed"
                );
            }
            Err(CluError::Cancelled) => {
                self.metrics.record_error(CluError::Cancelled.kind());
                tracing::debug!("Prediction cancelled");
            }
            Err(e) => {
                self.metrics.record_request(false, timer.elapsed());
                self.metrics.record_error(e.kind());
                log_error(e, timer.operation());
            }
        }

        result
    }

    /// Builds the HTTP request for an utterance without sending it.
    ///
    /// Custom headers never replace `Content-Type` or a header set by the
    /// auth provider; names are compared case-insensitively.
    pub fn build_request(&self, utterance: &str) -> CluResult<HttpRequest> {
        let url = self.config.prediction_url()?;
        let body = PredictionRequest::from_config(utterance, &self.config).to_json()?;

        let mut fixed = HashMap::new();
        fixed.insert(
            CONTENT_TYPE.to_string(),
            "application/json; charset=utf-8".to_string(),
        );
        self.auth.apply_auth(&mut fixed);

        let mut request = HttpRequest::post(url).with_body(body);
        for (name, value) in &self.config.custom_headers {
            if fixed.keys().any(|f| f.eq_ignore_ascii_case(name)) {
                tracing::warn!(header = %name, "Ignoring custom header that overrides a reserved header");
                continue;
            }
            request = request.with_header(name.as_str(), value.as_str());
        }
        for (name, value) in fixed {
            request = request.with_header(name, value);
        }

        Ok(request)
    }

    async fn execute(
        &self,
        utterance: &str,
        cancel: &CancellationToken,
        timer: &RequestTimer,
    ) -> CluResult<PredictionResponse> {
        if cancel.is_cancelled() {
            return Err(CluError::Cancelled);
        }

        let request = self.build_request(utterance)?;
        log_request("POST", request.url.as_str(), request.body.as_deref());

        let deadline = self.config.timeout;
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CluError::Cancelled),
            result = tokio::time::timeout(deadline, self.transport.send(request)) => match result {
                Ok(response) => response?,
                Err(_) => return Err(CluError::Timeout { timeout: deadline }),
            },
        };

        log_response(response.status, timer.elapsed_ms(), &response.body);
        parse_response(&response)
    }
}

fn parse_response(response: &HttpResponse) -> CluResult<PredictionResponse> {
    if !response.is_success() {
        let body = response.text();
        return Err(CluError::status(
            response.status,
            if body.is_empty() { None } else { Some(body) },
        ));
    }

    PredictionResponse::from_slice(&response.body)
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
