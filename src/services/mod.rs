//! Service implementations for the CLU API.

mod prediction;

pub use prediction::PredictionService;
