//! CLU API client.
//!
//! Provides the main client interface for the prediction endpoint.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::auth::{AuthProvider, SubscriptionKeyAuth};
use crate::config::{CluConfig, CluConfigBuilder};
use crate::errors::{CluError, CluResult};
use crate::observability::{DefaultMetricsCollector, MetricsCollector, RequestMetrics};
use crate::services::PredictionService;
use crate::transport::{HttpTransport, HttpTransportImpl};
use crate::types::prediction::PredictionResponse;
use crate::types::trace::PredictionTrace;

/// The main CLU client.
///
/// The client is cheap to share: wrap it in an `Arc` and call it from as
/// many tasks as needed. All calls reuse one connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use clu_client::CluClient;
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = CluClient::builder()
///         .endpoint("https://contoso.cognitiveservices.azure.com")
///         .endpoint_key("your-subscription-key")
///         .project_name("HomeAutomation")
///         .deployment_name("production")
///         .build()?;
///
///     let prediction = client
///         .predict("turn on the kitchen lights", &CancellationToken::new())
///         .await?;
///     println!("{:?}", prediction.top_intent());
///     Ok(())
/// }
/// ```
pub struct CluClient {
    config: Arc<CluConfig>,
    prediction_service: PredictionService,
    metrics: Arc<dyn MetricsCollector>,
}

impl CluClient {
    /// Creates a new client builder.
    pub fn builder() -> CluClientBuilder {
        CluClientBuilder::new()
    }

    /// Creates a client from environment variables.
    ///
    /// See [`CluConfig::from_env`] for the variables read.
    pub fn from_env() -> CluResult<Self> {
        let config = CluConfig::from_env()?;
        CluClientBuilder::from_config(config).build()
    }

    /// Submits an utterance and returns the prediction document.
    ///
    /// Shorthand for `client.prediction().predict(..)`.
    pub async fn predict(
        &self,
        utterance: &str,
        cancel: &CancellationToken,
    ) -> CluResult<PredictionResponse> {
        self.prediction_service.predict(utterance, cancel).await
    }

    /// Builds a trace record for a prediction made by this client.
    pub fn trace(&self, utterance: &str, prediction: PredictionResponse) -> PredictionTrace {
        PredictionTrace::new(&self.config, utterance, prediction)
    }

    /// Returns the prediction service.
    pub fn prediction(&self) -> &PredictionService {
        &self.prediction_service
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CluConfig {
        &self.config
    }

    /// Returns a snapshot of the request metrics.
    pub fn metrics(&self) -> RequestMetrics {
        self.metrics.get_metrics()
    }
}

impl std::fmt::Debug for CluClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CluClient")
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for the CLU client.
pub struct CluClientBuilder {
    config_builder: CluConfigBuilder,
    config: Option<CluConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    auth: Option<Arc<dyn AuthProvider>>,
    metrics: Option<Arc<dyn MetricsCollector>>,
}

impl CluClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            config_builder: CluConfigBuilder::new(),
            config: None,
            transport: None,
            auth: None,
            metrics: None,
        }
    }

    /// Creates a builder from an existing configuration.
    ///
    /// Configuration setters on the builder are ignored when a complete
    /// configuration is supplied.
    pub fn from_config(config: CluConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::new()
        }
    }

    /// Sets the resource endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.endpoint(endpoint);
        self
    }

    /// Sets the subscription key.
    pub fn endpoint_key(mut self, key: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.endpoint_key(key);
        self
    }

    /// Sets the subscription key from an environment variable.
    pub fn endpoint_key_from_env(mut self, var_name: &str) -> CluResult<Self> {
        self.config_builder = self.config_builder.endpoint_key_from_env(var_name)?;
        Ok(self)
    }

    /// Sets the project name.
    pub fn project_name(mut self, project_name: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.project_name(project_name);
        self
    }

    /// Sets the deployment name.
    pub fn deployment_name(mut self, deployment_name: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.deployment_name(deployment_name);
        self
    }

    /// Sets the API version.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.api_version(api_version);
        self
    }

    /// Sets the utterance language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.language(language);
        self
    }

    /// Sets the verbose flag.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config_builder = self.config_builder.verbose(verbose);
        self
    }

    /// Sets the service-side logging flag.
    pub fn logging_enabled(mut self, enabled: bool) -> Self {
        self.config_builder = self.config_builder.logging_enabled(enabled);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Adds a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.header(name, value);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets a custom auth provider.
    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets a custom metrics collector.
    pub fn metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Builds the client.
    pub fn build(self) -> CluResult<CluClient> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_builder.build()?,
        };
        let config = Arc::new(config);

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(
                HttpTransportImpl::new(config.timeout)
                    .map_err(|e| CluError::configuration(e.to_string()))?,
            ),
        };

        let auth: Arc<dyn AuthProvider> = match self.auth {
            Some(a) => a,
            None => Arc::new(SubscriptionKeyAuth::from_string(config.endpoint_key())),
        };
        auth.validate()?;

        let metrics: Arc<dyn MetricsCollector> = self
            .metrics
            .unwrap_or_else(|| Arc::new(DefaultMetricsCollector::new()));

        let prediction_service = PredictionService::new(
            Arc::clone(&config),
            transport,
            auth,
            Arc::clone(&metrics),
        );

        tracing::debug!(
            endpoint = %config.endpoint,
            project = %config.project_name,
            deployment = %config.deployment_name,
            key_hint = %config.key_hint(),
            "CLU client created"
        );

        Ok(CluClient {
            config,
            prediction_service,
            metrics,
        })
    }
}

impl Default for CluClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
