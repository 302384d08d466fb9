//! Command-line interface for the rolling multi-month revenue forecast

use anyhow::Result;
use clap::{Parser, ValueEnum};
use revenue_forecast::config::ForecastParams;
use revenue_forecast::pipeline::{run_forecast, Hotel, ReportEntry, ReportSink};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(version, about = "Rolling multi-month hotel revenue forecast")]
struct Cli {
    /// Start month for forecast
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: u32,

    /// Start year for forecast
    #[arg(short, long, value_parser = clap::value_parser!(i32).range(2023..=2025))]
    year: i32,

    /// Actual revenue for the two preceding months
    #[arg(short, long, num_args = 2, value_names = ["PREV", "LAST"])]
    revenue: Vec<f64>,

    /// Name of the hotel for forecast
    #[arg(long = "hotel", value_enum)]
    hotel: HotelArg,

    /// Parameter file
    #[arg(long, default_value = "params.toml")]
    params: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HotelArg {
    #[value(name = "city-hotel")]
    City,
    #[value(name = "resort-hotel")]
    Resort,
}

impl From<HotelArg> for Hotel {
    fn from(arg: HotelArg) -> Self {
        match arg {
            HotelArg::City => Hotel::CityHotel,
            HotelArg::Resort => Hotel::ResortHotel,
        }
    }
}

/// Sink that writes each report line to the log
struct LogSink;

impl ReportSink for LogSink {
    fn emit(&mut self, entry: &ReportEntry) {
        info!("{:<8} {}\t{:.2}", entry.label, entry.period, entry.value);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();
    let hotel = Hotel::from(cli.hotel);

    info!(
        "Requested rolling revenue forecast for {} starting from {:02}-{}",
        hotel, cli.month, cli.year
    );

    let params = match ForecastParams::from_path(&cli.params) {
        Ok(params) => params,
        Err(e) => {
            error!("Can't load {}. {}", cli.params.display(), e);
            return Ok(());
        }
    };
    info!("Parameters check passed successfully");
    info!(
        "{} rolling {}-month revenue forecast",
        hotel, params.n_steps
    );

    let report = match run_forecast(
        cli.month,
        cli.year,
        (cli.revenue[0], cli.revenue[1]),
        hotel,
        &params,
        &mut LogSink,
    ) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return Ok(());
        }
    };

    info!("Emitted {} report lines for {}", report.entries.len(), report.series);

    Ok(())
}
