//! Walk-forward model evaluation over held-out validation data

use crate::data::column_as_f64;
use crate::error::{ForecastError, Result};
use crate::model::Forecaster;
use polars::prelude::*;

/// Run a walk-forward evaluation of a fitted model over validation data.
///
/// The last `n_lag` rows of `train` are concatenated with all of `valid` into
/// one evaluation frame. The evaluation window then slides forward one period
/// at a time: for each of the `n_tests` positions the model predicts
/// `n_steps` periods from the `n_lag`-wide window of `series_column`, with
/// the frame's `exog_columns` rows for the forecast horizon as covariates,
/// and is scored against the observations that follow the window.
///
/// Returns the flat sequence of absolute errors in window-major, step-minor
/// order (`n_tests * n_steps` values when the data covers every window) and
/// the list of raw forecasts, one per window. The first model failure aborts
/// the evaluation; a partially evaluated run would invalidate the aggregate
/// error statistics.
///
/// Callers must supply enough validation data to cover every window; an
/// undersized frame yields truncated windows at the tail.
#[allow(clippy::too_many_arguments)]
pub fn evaluate(
    train: &DataFrame,
    valid: &DataFrame,
    model: &dyn Forecaster,
    series_column: &str,
    n_tests: usize,
    n_lag: usize,
    n_steps: usize,
    exog_columns: &[String],
) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
    if train.height() < n_lag {
        return Err(ForecastError::Data(format!(
            "Training data has {} rows, need at least n_lag={}",
            train.height(),
            n_lag
        )));
    }

    // last n_lag training periods followed by all validation periods
    let tail = train.slice((train.height() - n_lag) as i64, n_lag);
    let frame = tail.vstack(valid)?;

    let target = column_as_f64(&frame, series_column)?;
    let exog = frame.select(exog_columns)?;

    let mut absolute_errors = Vec::with_capacity(n_tests * n_steps);
    let mut forecasts = Vec::with_capacity(n_tests);

    for i in 0..n_tests {
        let window_end = (i + n_lag).min(target.len());
        let observation_end = (i + n_lag + n_steps).min(target.len());

        let window = &target[i.min(window_end)..window_end];
        let observation = &target[window_end..observation_end];
        // exogenous rows aligned to the forecast horizon; polars truncates
        // the slice at the frame boundary
        let horizon_exog = exog.slice((i + n_lag) as i64, n_steps);

        let forecast = model.predict(n_steps, window, &horizon_exog)?;

        for (predicted, actual) in forecast.iter().zip(observation) {
            absolute_errors.push((predicted - actual).abs());
        }
        forecasts.push(forecast);
    }

    Ok((absolute_errors, forecasts))
}
