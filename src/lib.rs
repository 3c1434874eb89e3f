//! CLU Client Library
//!
//! A Rust client for conversational language understanding (LUIS vNext)
//! prediction endpoints. The client posts an utterance to
//! `{endpoint}/language/:analyze-conversations` and returns the prediction
//! document exactly as the service produced it.
//!
//! # Features
//!
//! - **One call, no surprises**: a single POST per prediction, no retries
//! - **Cancellation**: every call takes a [`CancellationToken`]
//! - **Fixed deadline**: 3 seconds by default, set once per client
//! - **Secure credentials**: the subscription key never shows up in `Debug` or logs
//! - **Observability**: `tracing` spans, redacted request logging, in-process metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use clu_client::{CancellationToken, CluClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CluClient::builder()
//!         .endpoint("https://contoso.cognitiveservices.azure.com")
//!         .endpoint_key("your-subscription-key")
//!         .project_name("HomeAutomation")
//!         .deployment_name("production")
//!         .language("en-us")
//!         .build()?;
//!
//!     let prediction = client
//!         .predict("turn on the kitchen lights", &CancellationToken::new())
//!         .await?;
//!
//!     println!("{}", serde_json::to_string_pretty(&prediction)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod services;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{CluClient, CluClientBuilder};
pub use config::{CluConfig, CluConfigBuilder};
pub use errors::{CluError, CluResult};
pub use tokio_util::sync::CancellationToken;

pub use types::prediction::{PredictionRequest, PredictionResponse};
pub use types::trace::{PredictionTrace, TraceOptions, LUIS_TRACE_TYPE};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
