//! # Revenue Forecast
//!
//! A Rust library for rolling multi-month hotel revenue forecasting from
//! booking-level records.
//!
//! ## Features
//!
//! - Daily revenue stream reconstruction from raw booking tables (handling
//!   cancellations, non-refundable deposits and multi-night stays)
//! - Walk-forward evaluation of forecasting-model accuracy over held-out
//!   validation data
//! - A forecast pipeline that assembles the model's last-observed window and
//!   exogenous seasonal features, invokes the model and emits a labeled
//!   actual + forecast report
//! - Serialized artifact loading for the fitted autoregressive model and the
//!   periodic spline transformer
//!
//! ## Quick Start
//!
//! ```no_run
//! use revenue_forecast::config::ForecastParams;
//! use revenue_forecast::data::{build_daily_revenue, BookingLoader};
//! use revenue_forecast::pipeline::{run_forecast, Hotel, NullSink};
//!
//! # fn main() -> revenue_forecast::Result<()> {
//! // Reconstruct the daily revenue stream from raw bookings
//! let bookings = BookingLoader::from_csv("hotel_bookings.csv")?;
//! let start = chrono::NaiveDate::from_ymd_opt(2015, 7, 1).unwrap();
//! let daily = build_daily_revenue(&bookings, 700, start);
//!
//! // Produce a rolling 6-month forecast from two preceding actuals
//! let params = ForecastParams::from_path("params.toml")?;
//! let report = run_forecast(
//!     2,
//!     2023,
//!     (180_000.0, 200_000.0),
//!     Hotel::CityHotel,
//!     &params,
//!     &mut NullSink,
//! )?;
//!
//! for entry in &report.entries {
//!     println!("{} {}\t{:.2}", entry.label, entry.period, entry.value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod validation;

// Re-export commonly used types
pub use crate::config::ForecastParams;
pub use crate::data::{build_daily_revenue, BookingRecord};
pub use crate::error::{ForecastError, Result};
pub use crate::model::{Forecaster, MonthTransformer};
pub use crate::pipeline::{run_forecast, ForecastReport, Hotel};
pub use crate::validation::evaluate;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
