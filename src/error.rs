//! Error types for the revenue_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the revenue_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Missing or inconsistent configuration (e.g. wrong `n_lags`)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Model or transformer artifact cannot be loaded from the given path
    #[error("Can't load artifact from '{path}': {reason}")]
    ArtifactLoad { path: String, reason: String },

    /// The external model or transformer failed during invocation
    #[error("Model invocation error: {0}")]
    ModelInvocation(String),

    /// Caller-supplied month/year/revenue outside the accepted domain
    #[error("Input range error: {0}")]
    InputRange(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    Data(String),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}
