//! Booking data handling and daily revenue stream reconstruction

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Deposit terms attached to a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositType {
    /// Cancellation still results in revenue recognition
    NonRefund,
    Refundable,
    /// No deposit or any unrecognized deposit label
    Other,
}

impl DepositType {
    /// Map the raw dataset label to a deposit type
    pub fn from_label(label: &str) -> Self {
        match label {
            "Non Refund" => DepositType::NonRefund,
            "Refundable" => DepositType::Refundable,
            _ => DepositType::Other,
        }
    }
}

/// One row of the raw bookings table
#[derive(Debug, Clone)]
pub struct BookingRecord {
    /// Whether the reservation was cancelled
    pub is_canceled: bool,
    /// Deposit terms of the reservation
    pub deposit_type: DepositType,
    /// Scheduled arrival date
    pub arrival_date: NaiveDate,
    /// Date the cancellation or checkout was recorded
    pub reservation_status_date: NaiveDate,
    /// Average daily rate
    pub adr: f64,
    /// Length of stay in nights
    pub total_nights: u32,
}

/// How a booking's revenue is attributed to calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenueAttribution {
    /// Full revenue recognized on the reservation status date
    AttributeToStatusDate,
    /// One daily rate per night of the stay, starting at arrival
    SpreadOverStay,
    /// No revenue recognized
    NoRevenue,
}

/// Classify a booking into its revenue attribution rule.
///
/// Cancelled non-refundable bookings keep their full revenue at the status
/// date; completed stays spread the daily rate over the stay; any other
/// cancelled booking contributes nothing.
pub fn classify_booking(booking: &BookingRecord) -> RevenueAttribution {
    if booking.is_canceled && booking.deposit_type == DepositType::NonRefund {
        RevenueAttribution::AttributeToStatusDate
    } else if !booking.is_canceled {
        RevenueAttribution::SpreadOverStay
    } else {
        RevenueAttribution::NoRevenue
    }
}

/// Calculate the daily revenue stream for a given period of time.
///
/// Returns a dense array of length `n_days`, index 0 anchored at
/// `start_date`. Contributions at the same day index are summed. A stay
/// running past the end of the analysed period is truncated there; no
/// corresponding clipping is applied at the start of the period, and
/// contributions falling outside `[0, n_days)` are dropped.
pub fn build_daily_revenue(
    bookings: &[BookingRecord],
    n_days: usize,
    start_date: NaiveDate,
) -> Vec<f64> {
    let mut revenue_stream = vec![0.0; n_days];

    for booking in bookings {
        match classify_booking(booking) {
            RevenueAttribution::AttributeToStatusDate => {
                let idx = (booking.reservation_status_date - start_date).num_days();
                if idx >= 0 && (idx as usize) < n_days {
                    revenue_stream[idx as usize] += booking.adr * booking.total_nights as f64;
                }
            }
            RevenueAttribution::SpreadOverStay => {
                let idx = (booking.arrival_date - start_date).num_days();
                for night in 0..booking.total_nights as i64 {
                    let day = idx + night;
                    if day > n_days as i64 - 1 {
                        // the stay goes after end of analysed period
                        break;
                    }
                    if day >= 0 {
                        revenue_stream[day as usize] += booking.adr;
                    }
                }
            }
            RevenueAttribution::NoRevenue => {}
        }
    }

    revenue_stream
}

/// Construct a date from a year, an English month name and a day of month
pub fn build_date(year: i32, month: &str, day: u32) -> Result<NaiveDate> {
    let text = format!("{}-{}-{}", year, month, day);
    NaiveDate::parse_from_str(&text, "%Y-%B-%d")
        .map_err(|e| ForecastError::Data(format!("Can't parse date '{}': {}", text, e)))
}

/// Aggregate a daily revenue stream into monthly totals.
///
/// Each bucket is labeled with its month-end period date. Partial months at
/// either end of the stream produce partial totals.
pub fn monthly_revenue(daily: &[f64], start_date: NaiveDate) -> Vec<(NaiveDate, f64)> {
    let mut buckets: Vec<(NaiveDate, f64)> = Vec::new();
    let mut date = start_date;

    for &value in daily {
        let period = month_end(date.year(), date.month());
        match buckets.last_mut() {
            Some((last, total)) if *last == period => *total += value,
            _ => buckets.push((period, value)),
        }
        date += Duration::days(1);
    }

    buckets
}

/// Shift a (year, month) pair by a signed number of months
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let zero_based = year * 12 + month as i32 - 1 + delta;
    (zero_based.div_euclid(12), zero_based.rem_euclid(12) as u32 + 1)
}

/// Last calendar day of the given month
pub fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = shift_month(year, month, 1);
    // month is normalized to 1..=12 by shift_month, so the 1st always exists
    NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap() - Duration::days(1)
}

/// Month-end period dates for `periods` consecutive months starting at
/// (`year`, `month`)
pub fn month_period_range(year: i32, month: u32, periods: usize) -> Vec<NaiveDate> {
    (0..periods)
        .map(|offset| {
            let (y, m) = shift_month(year, month, offset as i32);
            month_end(y, m)
        })
        .collect()
}

/// Loader for raw booking tables
#[derive(Debug)]
pub struct BookingLoader;

impl BookingLoader {
    /// Load booking records from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<BookingRecord>> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Extract booking records from an existing DataFrame.
    ///
    /// Expects the columns `is_canceled` (0/1), `deposit_type`,
    /// `arrival_date`, `reservation_status_date`, `adr` and `total_nights`.
    pub fn from_dataframe(df: &DataFrame) -> Result<Vec<BookingRecord>> {
        let canceled = column_as_f64(df, "is_canceled")?;
        let deposits = column_as_strings(df, "deposit_type")?;
        let arrivals = column_as_dates(df, "arrival_date")?;
        let statuses = column_as_dates(df, "reservation_status_date")?;
        let adrs = column_as_f64(df, "adr")?;
        let nights = column_as_f64(df, "total_nights")?;

        let n_rows = df.height();
        for (name, len) in [
            ("is_canceled", canceled.len()),
            ("deposit_type", deposits.len()),
            ("arrival_date", arrivals.len()),
            ("reservation_status_date", statuses.len()),
            ("adr", adrs.len()),
            ("total_nights", nights.len()),
        ] {
            if len != n_rows {
                return Err(ForecastError::Data(format!(
                    "Column '{}' has {} non-null values but the table has {} rows",
                    name, len, n_rows
                )));
            }
        }

        let mut records = Vec::with_capacity(n_rows);
        for i in 0..n_rows {
            records.push(BookingRecord {
                is_canceled: canceled[i] != 0.0,
                deposit_type: DepositType::from_label(&deposits[i]),
                arrival_date: arrivals[i],
                reservation_status_date: statuses[i],
                adr: adrs[i],
                total_nights: nights[i] as u32,
            });
        }

        Ok(records)
    }
}

/// Get a column as f64 values
pub(crate) fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Vec<f64>> {
    let col = df.column(column_name).map_err(|e| {
        ForecastError::Data(format!("Column '{}' not found: {}", column_name, e))
    })?;

    match col.dtype() {
        DataType::Float64 => Ok(col.f64().unwrap().into_iter().flatten().collect()),
        DataType::Float32 => Ok(col
            .f32()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|v| v as f64)
            .collect()),
        DataType::Int64 => Ok(col
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|v| v as f64)
            .collect()),
        DataType::Int32 => Ok(col
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|v| v as f64)
            .collect()),
        DataType::UInt64 => Ok(col
            .u64()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|v| v as f64)
            .collect()),
        DataType::UInt32 => Ok(col
            .u32()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|v| v as f64)
            .collect()),
        _ => Err(ForecastError::Data(format!(
            "Column '{}' cannot be converted to f64",
            column_name
        ))),
    }
}

/// Get a column as owned strings
fn column_as_strings(df: &DataFrame, column_name: &str) -> Result<Vec<String>> {
    let col = df.column(column_name).map_err(|e| {
        ForecastError::Data(format!("Column '{}' not found: {}", column_name, e))
    })?;

    match col.dtype() {
        DataType::Utf8 => Ok(col
            .utf8()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect()),
        _ => Err(ForecastError::Data(format!(
            "Column '{}' cannot be converted to strings",
            column_name
        ))),
    }
}

/// Get a column as calendar dates, accepting either a native date dtype or
/// ISO formatted strings
fn column_as_dates(df: &DataFrame, column_name: &str) -> Result<Vec<NaiveDate>> {
    let col = df.column(column_name).map_err(|e| {
        ForecastError::Data(format!("Column '{}' not found: {}", column_name, e))
    })?;

    match col.dtype() {
        DataType::Date => Ok(col
            .date()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|days| {
                NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + Duration::days(days as i64)
            })
            .collect()),
        DataType::Utf8 => col
            .utf8()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
                    ForecastError::Data(format!(
                        "Column '{}' has unparseable date '{}': {}",
                        column_name, s, e
                    ))
                })
            })
            .collect(),
        _ => Err(ForecastError::Data(format!(
            "Column '{}' cannot be converted to dates",
            column_name
        ))),
    }
}
