//! Forecast parameter file loading and validation

use crate::error::{ForecastError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Raw shape of the parameter file; every key optional so that a missing one
/// can be reported by name instead of failing the whole parse
#[derive(Debug, Deserialize)]
struct RawParams {
    models_path: Option<PathBuf>,
    exog_columns: Option<Vec<String>>,
    n_steps: Option<usize>,
    n_lags: Option<usize>,
}

/// Validated forecast parameters
#[derive(Debug, Clone)]
pub struct ForecastParams {
    /// Directory holding the serialized model artifacts
    pub models_path: PathBuf,
    /// Ordered names of the exogenous feature columns
    pub exog_columns: Vec<String>,
    /// Forecast horizon length in months
    pub n_steps: usize,
    /// Input window length the model was trained with
    pub n_lags: usize,
}

impl ForecastParams {
    /// Load and validate parameters from a TOML file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path)?;
        let raw: RawParams = toml::from_str(&text)
            .map_err(|e| ForecastError::Configuration(format!("Can't parse parameters: {}", e)))?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawParams) -> Result<Self> {
        Ok(Self {
            models_path: raw.models_path.ok_or_else(|| missing("models_path"))?,
            exog_columns: raw.exog_columns.ok_or_else(|| missing("exog_columns"))?,
            n_steps: raw.n_steps.ok_or_else(|| missing("n_steps"))?,
            n_lags: raw.n_lags.ok_or_else(|| missing("n_lags"))?,
        })
    }
}

fn missing(key: &str) -> ForecastError {
    ForecastError::Configuration(format!("{} parameter is missing", key))
}
