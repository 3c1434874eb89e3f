//! Configuration module for the CLU client.
//!
//! Holds the endpoint, subscription key, project and deployment identifiers,
//! and the optional prediction flags. A built `CluConfig` is immutable and
//! fully determines the prediction URL and the optional body fields.

use reqwest::header::{HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::errors::{CluError, CluResult};

/// Path of the conversation analysis operation, relative to the endpoint.
pub const ANALYZE_CONVERSATIONS_PATH: &str = "/language/:analyze-conversations";

/// Default API version.
pub const DEFAULT_API_VERSION: &str = "2021-11-01-preview";

/// Default request timeout (3 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Configuration for the CLU client.
#[derive(Clone)]
pub struct CluConfig {
    /// Subscription key (stored securely).
    pub(crate) endpoint_key: SecretString,
    /// Resource endpoint, without trailing slash.
    pub endpoint: String,
    /// Project name (the application identifier).
    pub project_name: String,
    /// Deployment name (the deployment slot).
    pub deployment_name: String,
    /// API version sent as `api-version`.
    pub api_version: String,
    /// Language of the utterances, sent only when set.
    pub language: Option<String>,
    /// Verbose flag, sent only when set.
    pub verbose: Option<bool>,
    /// Service-side logging flag, sent only when set.
    pub is_logging_enabled: Option<bool>,
    /// Request timeout.
    pub timeout: Duration,
    /// Custom headers to include in requests.
    pub custom_headers: Vec<(String, String)>,
}

impl CluConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CluConfigBuilder {
        CluConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CLU_ENDPOINT` (required): resource endpoint
    /// - `CLU_ENDPOINT_KEY` (required): subscription key
    /// - `CLU_PROJECT_NAME` (required): project name
    /// - `CLU_DEPLOYMENT_NAME` (required): deployment name
    /// - `CLU_API_VERSION` (optional): API version
    /// - `CLU_LANGUAGE` (optional): utterance language
    /// - `CLU_VERBOSE` (optional): `true` / `false`
    /// - `CLU_LOGGING_ENABLED` (optional): `true` / `false`
    /// - `CLU_TIMEOUT_MS` (optional): request timeout in milliseconds
    pub fn from_env() -> CluResult<Self> {
        let mut builder = CluConfigBuilder::new()
            .endpoint(required_env("CLU_ENDPOINT")?)
            .endpoint_key(required_env("CLU_ENDPOINT_KEY")?)
            .project_name(required_env("CLU_PROJECT_NAME")?)
            .deployment_name(required_env("CLU_DEPLOYMENT_NAME")?);

        if let Ok(api_version) = std::env::var("CLU_API_VERSION") {
            builder = builder.api_version(api_version);
        }

        if let Ok(language) = std::env::var("CLU_LANGUAGE") {
            builder = builder.language(language);
        }

        if let Ok(verbose) = std::env::var("CLU_VERBOSE") {
            if let Ok(verbose) = verbose.parse::<bool>() {
                builder = builder.verbose(verbose);
            }
        }

        if let Ok(logging) = std::env::var("CLU_LOGGING_ENABLED") {
            if let Ok(logging) = logging.parse::<bool>() {
                builder = builder.logging_enabled(logging);
            }
        }

        if let Ok(timeout_str) = std::env::var("CLU_TIMEOUT_MS") {
            if let Ok(timeout_ms) = timeout_str.parse::<u64>() {
                builder = builder.timeout(Duration::from_millis(timeout_ms));
            }
        }

        builder.build()
    }

    /// Returns the subscription key (exposing the secret).
    pub(crate) fn endpoint_key(&self) -> &str {
        self.endpoint_key.expose_secret()
    }

    /// Returns the key hint (last 4 characters) for debugging.
    pub fn key_hint(&self) -> String {
        key_hint(self.endpoint_key.expose_secret())
    }

    /// Returns the prediction URL with the project, deployment and API
    /// version query parameters, in that order.
    pub fn prediction_url(&self) -> CluResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.endpoint, ANALYZE_CONVERSATIONS_PATH))?;
        url.query_pairs_mut()
            .append_pair("projectName", &self.project_name)
            .append_pair("deploymentName", &self.deployment_name)
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }
}

impl std::fmt::Debug for CluConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CluConfig")
            .field("endpoint_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("project_name", &self.project_name)
            .field("deployment_name", &self.deployment_name)
            .field("api_version", &self.api_version)
            .field("language", &self.language)
            .field("verbose", &self.verbose)
            .field("is_logging_enabled", &self.is_logging_enabled)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub(crate) fn key_hint(key: &str) -> String {
    if key.len() > 4 && key.is_char_boundary(key.len() - 4) {
        format!("...{}", &key[key.len() - 4..])
    } else {
        "****".to_string()
    }
}

fn required_env(name: &str) -> CluResult<String> {
    std::env::var(name)
        .map_err(|_| CluError::configuration(format!("{} environment variable not set", name)))
}

/// Builder for `CluConfig`.
#[derive(Default)]
pub struct CluConfigBuilder {
    endpoint: Option<String>,
    endpoint_key: Option<String>,
    project_name: Option<String>,
    deployment_name: Option<String>,
    api_version: Option<String>,
    language: Option<String>,
    verbose: Option<bool>,
    is_logging_enabled: Option<bool>,
    timeout: Option<Duration>,
    custom_headers: Vec<(String, String)>,
}

impl CluConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resource endpoint, e.g. `https://myresource.cognitiveservices.azure.com`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the subscription key.
    pub fn endpoint_key(mut self, key: impl Into<String>) -> Self {
        self.endpoint_key = Some(key.into());
        self
    }

    /// Sets the subscription key from an environment variable.
    pub fn endpoint_key_from_env(mut self, var_name: &str) -> CluResult<Self> {
        let key = std::env::var(var_name).map_err(|_| {
            CluError::configuration(format!("Environment variable {} not set", var_name))
        })?;
        self.endpoint_key = Some(key);
        Ok(self)
    }

    /// Sets the project name.
    pub fn project_name(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = Some(project_name.into());
        self
    }

    /// Sets the deployment name.
    pub fn deployment_name(mut self, deployment_name: impl Into<String>) -> Self {
        self.deployment_name = Some(deployment_name.into());
        self
    }

    /// Sets the API version.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Sets the utterance language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the verbose flag.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Sets the service-side logging flag.
    pub fn logging_enabled(mut self, enabled: bool) -> Self {
        self.is_logging_enabled = Some(enabled);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> CluResult<CluConfig> {
        let endpoint = non_empty(self.endpoint, "Endpoint")?
            .trim_end_matches('/')
            .to_string();
        let endpoint_key = non_empty(self.endpoint_key, "Endpoint key")?;
        let project_name = non_empty(self.project_name, "Project name")?;
        let deployment_name = non_empty(self.deployment_name, "Deployment name")?;

        let parsed = Url::parse(&endpoint)?;
        match parsed.scheme() {
            "https" => {}
            "http" => {
                tracing::warn!(endpoint = %endpoint, "Endpoint does not use HTTPS");
            }
            other => {
                return Err(CluError::configuration(format!(
                    "Endpoint scheme must be http or https, got {}",
                    other
                )));
            }
        }

        for (name, value) in &self.custom_headers {
            validate_header(name, value)?;
        }

        Ok(CluConfig {
            endpoint_key: SecretString::new(endpoint_key),
            endpoint,
            project_name,
            deployment_name,
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            language: self.language,
            verbose: self.verbose,
            is_logging_enabled: self.is_logging_enabled,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            custom_headers: self.custom_headers,
        })
    }
}

fn validate_header(name: &str, value: &str) -> CluResult<()> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
        CluError::configuration(format!("Invalid custom header name {:?}", name))
    })?;
    HeaderValue::from_str(value).map_err(|_| {
        CluError::configuration(format!("Invalid value for custom header {}", name))
    })?;
    Ok(())
}

fn non_empty(value: Option<String>, what: &str) -> CluResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        Some(_) => Err(CluError::configuration(format!("{} cannot be empty", what))),
        None => Err(CluError::configuration(format!("{} is required", what))),
    }
}
