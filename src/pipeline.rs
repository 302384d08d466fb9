//! Rolling revenue forecast pipeline: windowing, exogenous feature
//! construction, model invocation and report assembly

use crate::config::ForecastParams;
use crate::data::{month_period_range, shift_month};
use crate::error::{ForecastError, Result};
use crate::model::{ArtifactStore, Forecaster, MonthTransformer};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::fmt;

/// Number of preceding actual observations the pipeline accepts
const PIPELINE_ACTUALS: usize = 2;

/// Series identifiers the trained models cover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotel {
    CityHotel,
    ResortHotel,
}

impl Hotel {
    /// Dataset name of the series
    pub fn display_name(&self) -> &'static str {
        match self {
            Hotel::CityHotel => "City Hotel",
            Hotel::ResortHotel => "Resort Hotel",
        }
    }

    /// File stem of the serialized model artifact
    pub fn artifact_stem(&self) -> &'static str {
        match self {
            Hotel::CityHotel => "CityHotel",
            Hotel::ResortHotel => "ResortHotel",
        }
    }
}

impl fmt::Display for Hotel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Whether a report entry is an observed or a predicted value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLabel {
    Actual,
    Forecast,
}

impl fmt::Display for ReportLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLabel::Actual => f.pad("Actual"),
            ReportLabel::Forecast => f.pad("Forecast"),
        }
    }
}

/// One (period, label, value) line of the forecast report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    /// Month-end period date
    pub period: NaiveDate,
    pub label: ReportLabel,
    pub value: f64,
}

/// Labeled actual + forecast report, in chronological order
#[derive(Debug, Clone)]
pub struct ForecastReport {
    /// Name of the forecast series
    pub series: String,
    /// The actual entries followed by the forecast entries
    pub entries: Vec<ReportEntry>,
}

impl ForecastReport {
    /// The observed entries of the report
    pub fn actuals(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|e| e.label == ReportLabel::Actual)
    }

    /// The predicted entries of the report
    pub fn forecasts(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|e| e.label == ReportLabel::Forecast)
    }
}

/// Caller-supplied sink receiving report entries in emission order
pub trait ReportSink {
    fn emit(&mut self, entry: &ReportEntry);
}

/// Sink that discards every entry
#[derive(Debug, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn emit(&mut self, _entry: &ReportEntry) {}
}

/// Collecting sink, mainly for tests and buffered display
impl ReportSink for Vec<ReportEntry> {
    fn emit(&mut self, entry: &ReportEntry) {
        self.push(entry.clone());
    }
}

/// Produce a rolling revenue forecast with an already loaded model and
/// transformer.
///
/// The last window pairs the two `recent_actuals` (chronological order) with
/// the two monthly periods immediately preceding the forecast start; the
/// forecast window covers the `n_steps` periods from the start. Forecast
/// month numbers go through the transformer to become the exogenous frame,
/// labeled per `params.exog_columns`. Every report entry is pushed through
/// `sink` as it is produced.
#[allow(clippy::too_many_arguments)]
pub fn forecast_with(
    start_month: u32,
    start_year: i32,
    recent_actuals: (f64, f64),
    series_name: &str,
    params: &ForecastParams,
    model: &dyn Forecaster,
    transformer: &dyn MonthTransformer,
    sink: &mut dyn ReportSink,
) -> Result<ForecastReport> {
    if !(1..=12).contains(&start_month) {
        return Err(ForecastError::InputRange(format!(
            "Start month must be in 1..=12, got {}",
            start_month
        )));
    }
    if params.n_lags != PIPELINE_ACTUALS {
        return Err(ForecastError::Configuration(format!(
            "Command expects a model trained with n_lags={}, but {} was given",
            PIPELINE_ACTUALS, params.n_lags
        )));
    }

    // monthly period ranges for the last window and the forecast window
    let (window_year, window_month) = shift_month(start_year, start_month, -(params.n_lags as i32));
    let last_window_periods = month_period_range(window_year, window_month, params.n_lags);
    let forecast_periods = month_period_range(start_year, start_month, params.n_steps);

    let last_window = [recent_actuals.0, recent_actuals.1];
    let forecast_months: Vec<u32> = forecast_periods.iter().map(|p| p.month()).collect();

    let exog = exog_frame(transformer, &forecast_months, &params.exog_columns)?;
    let forecast = model.predict(params.n_steps, &last_window, &exog)?;

    let mut report = ForecastReport {
        series: series_name.to_string(),
        entries: Vec::with_capacity(params.n_lags + params.n_steps),
    };

    for (&period, &value) in last_window_periods.iter().zip(&last_window) {
        push_entry(&mut report, sink, period, ReportLabel::Actual, value);
    }
    for (&period, &value) in forecast_periods.iter().zip(&forecast) {
        push_entry(&mut report, sink, period, ReportLabel::Forecast, value);
    }

    Ok(report)
}

/// Produce a rolling revenue forecast, loading the hotel's model and the
/// spline transformer from `params.models_path`.
///
/// Configuration and artifact problems are detected before any model
/// invocation and abort the run without a partial report.
pub fn run_forecast(
    start_month: u32,
    start_year: i32,
    recent_actuals: (f64, f64),
    hotel: Hotel,
    params: &ForecastParams,
    sink: &mut dyn ReportSink,
) -> Result<ForecastReport> {
    if params.n_lags != PIPELINE_ACTUALS {
        return Err(ForecastError::Configuration(format!(
            "Command expects a model trained with n_lags={}, but {} was given",
            PIPELINE_ACTUALS, params.n_lags
        )));
    }

    let store = ArtifactStore::new(&params.models_path);
    let model = store.load_forecaster(hotel.artifact_stem())?;
    let transformer = store.load_transformer()?;

    forecast_with(
        start_month,
        start_year,
        recent_actuals,
        hotel.display_name(),
        params,
        &model,
        &transformer,
        sink,
    )
}

/// Transform forecast-window month numbers into the labeled exogenous frame
fn exog_frame(
    transformer: &dyn MonthTransformer,
    months: &[u32],
    exog_columns: &[String],
) -> Result<DataFrame> {
    let rows = transformer.transform(months)?;

    if transformer.n_features() != exog_columns.len() {
        return Err(ForecastError::Configuration(format!(
            "exog_columns names {} features but the transformer produces {}",
            exog_columns.len(),
            transformer.n_features()
        )));
    }

    let series: Vec<Series> = exog_columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let values: Vec<f64> = rows.iter().map(|row| row[col]).collect();
            Series::new(name, values)
        })
        .collect();

    Ok(DataFrame::new(series)?)
}

fn push_entry(
    report: &mut ForecastReport,
    sink: &mut dyn ReportSink,
    period: NaiveDate,
    label: ReportLabel,
    value: f64,
) {
    let entry = ReportEntry {
        period,
        label,
        value,
    };
    sink.emit(&entry);
    report.entries.push(entry);
}
