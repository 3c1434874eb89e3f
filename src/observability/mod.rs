//! Observability module for the CLU client.
//!
//! Provides structured logging setup, redaction of subscription keys, and
//! in-process request metrics.

mod logging;
mod metrics;

pub use logging::{
    log_error, log_request, log_response, redact, LogFormat, LogLevel, LoggingConfig,
    MAX_LOGGED_BODY,
};
pub use metrics::{DefaultMetricsCollector, MetricsCollector, NoopMetricsCollector, RequestMetrics};

use std::time::{Duration, Instant};

/// Request timer for measuring operation duration.
#[derive(Debug)]
pub struct RequestTimer {
    start: Instant,
    operation: &'static str,
}

impl RequestTimer {
    /// Starts a timer for `operation`.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    /// Returns the elapsed time.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns the elapsed time in whole milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Returns the operation name.
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}
