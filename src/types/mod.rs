//! Type definitions for the CLU API.

pub mod prediction;
pub mod trace;
