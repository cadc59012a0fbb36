//! Error types for n24-drift
//!
//! The drift, cycle and prediction math never fails. Errors only arise at the
//! boundaries: parsing record JSON, loading configuration and encoding output.

use thiserror::Error;

/// Errors that can occur while moving data in or out of the engine
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse sleep log: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
