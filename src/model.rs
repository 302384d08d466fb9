//! Forecasting model and periodic feature transformer contracts, plus the
//! serialized artifact implementations loaded from disk

use crate::data::column_as_f64;
use crate::error::{ForecastError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Trained forecasting model.
///
/// `exog` carries one row of exogenous features per forecast step. Prediction
/// must be idempotent for identical inputs; failures are signaled through
/// `Err`, never through a degenerate numeric result.
pub trait Forecaster: Debug {
    /// Predict `steps` periods ahead given the most recent observed values
    fn predict(&self, steps: usize, last_window: &[f64], exog: &DataFrame) -> Result<Vec<f64>>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Periodic month-of-year feature transformer.
///
/// Produces one feature row per input month; the number of feature columns is
/// fixed at construction time.
pub trait MonthTransformer: Debug {
    /// Encode month numbers (1..=12) into feature rows
    fn transform(&self, months: &[u32]) -> Result<Vec<Vec<f64>>>;

    /// Number of feature columns produced per month
    fn n_features(&self) -> usize;
}

/// Fitted linear autoregressive forecaster, deserialized from a JSON
/// artifact produced at training time.
///
/// Multi-step forecasts use the standard recursive scheme: each predicted
/// value joins the window used for the following step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoregForecaster {
    name: String,
    intercept: f64,
    /// Coefficient per lag, most recent lag first
    lag_coefs: Vec<f64>,
    /// Coefficient per exogenous feature column
    exog_coefs: Vec<f64>,
}

impl AutoregForecaster {
    /// Build a forecaster from fitted coefficients
    pub fn new(
        name: impl Into<String>,
        intercept: f64,
        lag_coefs: Vec<f64>,
        exog_coefs: Vec<f64>,
    ) -> Result<Self> {
        if lag_coefs.is_empty() {
            return Err(ForecastError::Configuration(
                "Autoregressive model needs at least one lag coefficient".to_string(),
            ));
        }

        Ok(Self {
            name: name.into(),
            intercept,
            lag_coefs,
            exog_coefs,
        })
    }

    /// Input window width the model was trained with
    pub fn n_lags(&self) -> usize {
        self.lag_coefs.len()
    }

    /// Collect the exogenous frame into rows of f64, validating its shape
    fn exog_rows(&self, exog: &DataFrame, steps: usize) -> Result<Vec<Vec<f64>>> {
        if self.exog_coefs.is_empty() {
            return Ok(vec![Vec::new(); steps]);
        }

        if exog.width() != self.exog_coefs.len() {
            return Err(ForecastError::ModelInvocation(format!(
                "Model expects {} exogenous columns, got {}",
                self.exog_coefs.len(),
                exog.width()
            )));
        }
        if exog.height() != steps {
            return Err(ForecastError::ModelInvocation(format!(
                "Model expects one exogenous row per step ({}), got {}",
                steps,
                exog.height()
            )));
        }

        let mut columns = Vec::with_capacity(exog.width());
        for name in exog.get_column_names() {
            let values = column_as_f64(exog, name)?;
            if values.len() != steps {
                return Err(ForecastError::ModelInvocation(format!(
                    "Exogenous column '{}' contains nulls",
                    name
                )));
            }
            columns.push(values);
        }

        Ok((0..steps)
            .map(|row| columns.iter().map(|col| col[row]).collect())
            .collect())
    }
}

impl Forecaster for AutoregForecaster {
    fn predict(&self, steps: usize, last_window: &[f64], exog: &DataFrame) -> Result<Vec<f64>> {
        let n_lags = self.lag_coefs.len();
        if last_window.len() < n_lags {
            return Err(ForecastError::ModelInvocation(format!(
                "Model needs a last window of {} values, got {}",
                n_lags,
                last_window.len()
            )));
        }

        let exog_rows = self.exog_rows(exog, steps)?;

        // seed the rolling window with the most recent observations
        let mut window = last_window[last_window.len() - n_lags..].to_vec();
        let mut forecast = Vec::with_capacity(steps);

        for row in exog_rows.iter().take(steps) {
            let mut value = self.intercept;
            for (lag, coef) in self.lag_coefs.iter().enumerate() {
                value += coef * window[window.len() - 1 - lag];
            }
            for (feature, coef) in row.iter().zip(&self.exog_coefs) {
                value += coef * feature;
            }
            forecast.push(value);
            window.push(value);
        }

        Ok(forecast)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Periodic spline basis transformer, deserialized from a JSON artifact.
///
/// The spline basis itself is derived at training time; the artifact stores
/// the precomputed basis row for each month of the period, so transformation
/// is a table lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplineBasisTransformer {
    /// Length of the period, normally 12
    period: u32,
    /// One precomputed basis row per month, in month order
    basis: Vec<Vec<f64>>,
}

impl SplineBasisTransformer {
    /// Build a transformer from a precomputed basis table
    pub fn new(period: u32, basis: Vec<Vec<f64>>) -> Result<Self> {
        if basis.len() != period as usize {
            return Err(ForecastError::Configuration(format!(
                "Spline basis has {} rows but period is {}",
                basis.len(),
                period
            )));
        }
        let width = basis.first().map(Vec::len).unwrap_or(0);
        if width == 0 || basis.iter().any(|row| row.len() != width) {
            return Err(ForecastError::Configuration(
                "Spline basis rows must be non-empty and of equal width".to_string(),
            ));
        }

        Ok(Self { period, basis })
    }
}

impl MonthTransformer for SplineBasisTransformer {
    fn transform(&self, months: &[u32]) -> Result<Vec<Vec<f64>>> {
        months
            .iter()
            .map(|&month| {
                if month < 1 || month > self.period {
                    return Err(ForecastError::ModelInvocation(format!(
                        "Month number {} outside period 1..={}",
                        month, self.period
                    )));
                }
                Ok(self.basis[(month - 1) as usize].clone())
            })
            .collect()
    }

    fn n_features(&self) -> usize {
        self.basis.first().map(Vec::len).unwrap_or(0)
    }
}

/// File name of the serialized spline transformer inside the models directory
pub const TRANSFORMER_FILE: &str = "spline_transformer.json";

/// Resolves and loads serialized model artifacts from a models directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    models_path: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given models directory
    pub fn new<P: AsRef<Path>>(models_path: P) -> Self {
        Self {
            models_path: models_path.as_ref().to_path_buf(),
        }
    }

    /// Load the forecaster artifact for a series, e.g. `CityHotel.json`
    pub fn load_forecaster(&self, artifact_stem: &str) -> Result<AutoregForecaster> {
        let path = self.models_path.join(format!("{}.json", artifact_stem));
        self.load_json(&path)
    }

    /// Load the shared spline transformer artifact
    pub fn load_transformer(&self) -> Result<SplineBasisTransformer> {
        let path = self.models_path.join(TRANSFORMER_FILE);
        self.load_json(&path)
    }

    fn load_json<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Result<T> {
        let file = File::open(path).map_err(|e| ForecastError::ArtifactLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_reader(file).map_err(|e| ForecastError::ArtifactLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
