//! Logging configuration and utilities.
//!
//! Structured logging goes through `tracing`. Applications that do not
//! install their own subscriber can call [`LoggingConfig::init`].

use regex::Regex;
use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Maximum number of body characters written to a log event.
pub const MAX_LOGGED_BODY: usize = 1000;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// The minimum log level to capture
    pub level: LogLevel,
    /// The output format for log messages
    pub format: LogFormat,
    /// Whether to include the module target in log output
    pub include_target: bool,
    /// Whether to include file and line number in log output
    pub include_file_line: bool,
}

/// Log level enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace-level logging (most verbose)
    Trace,
    /// Debug-level logging
    Debug,
    /// Info-level logging
    Info,
    /// Warning-level logging
    Warn,
    /// Error-level logging (least verbose)
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl From<LogLevel> for tracing::level_filters::LevelFilter {
    fn from(level: LogLevel) -> Self {
        Level::from(level).into()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors (for development)
    Pretty,
    /// JSON format (for structured logging in production)
    Json,
    /// Compact format
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            include_target: true,
            include_file_line: false,
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets whether to include the module target.
    pub fn with_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }

    /// Sets whether to include file and line number.
    pub fn with_file_line(mut self, include: bool) -> Self {
        self.include_file_line = include;
        self
    }

    /// Installs a global `tracing` subscriber with this configuration.
    ///
    /// `RUST_LOG` directives are honored in addition to the configured level.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed.
    pub fn init(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let level: tracing::level_filters::LevelFilter = self.level.into();
        let filter = EnvFilter::from_default_env().add_directive(level.into());

        match self.format {
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        fmt::layer()
                            .with_ansi(true)
                            .with_target(self.include_target)
                            .with_file(self.include_file_line)
                            .with_line_number(self.include_file_line),
                    )
                    .try_init()?;
            }
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init()?;
            }
            LogFormat::Compact => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init()?;
            }
        }

        Ok(())
    }
}

fn redaction_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (
                r"(?i)ocp-apim-subscription-key([\x22']?\s*[=:]\s*[\x22']?)[^\s,&\x22'}]+",
                "Ocp-Apim-Subscription-Key${1}***",
            ),
            (
                r"(?i)subscription-key=[^\s&]+",
                "subscription-key=***",
            ),
        ]
        .into_iter()
        .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
        .collect()
    })
}

/// Redacts subscription keys from text bound for logs.
pub fn redact(text: &str) -> String {
    let mut result = text.to_string();
    for (re, replacement) in redaction_patterns() {
        result = re.replace_all(&result, *replacement).into_owned();
    }
    result
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_LOGGED_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Renders at most [`MAX_LOGGED_BODY`] characters of a body.
///
/// Only a bounded prefix is decoded, so large bodies cost the same as
/// small ones. Invalid UTF-8 is replaced rather than dropped.
fn body_excerpt(body: &[u8]) -> String {
    // A char is at most four bytes.
    let prefix = &body[..body.len().min(MAX_LOGGED_BODY * 4)];
    let text = String::from_utf8_lossy(prefix);
    truncate(&text).to_string()
}

/// Log an outgoing HTTP request.
pub fn log_request(method: &str, url: &str, body: Option<&[u8]>) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    let body = body.map_or_else(|| "<empty>".to_string(), |b| redact(&body_excerpt(b)));
    tracing::debug!(
        method = method,
        url = %redact(url),
        body = %body,
        "Outgoing request"
    );
}

/// Log an incoming HTTP response.
pub fn log_response(status: u16, duration_ms: u64, body: &[u8]) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    let body = if body.is_empty() {
        "<empty>".to_string()
    } else {
        body_excerpt(body)
    };
    tracing::debug!(
        status = status,
        duration_ms = duration_ms,
        body = %body,
        "Incoming response"
    );
}

/// Log an error with context.
pub fn log_error(error: &dyn std::error::Error, context: &str) {
    tracing::error!(
        error = %redact(&error.to_string()),
        context = context,
        "Error occurred"
    );
}
