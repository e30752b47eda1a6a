//! Command-line parsing for the KPI forecaster.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline code. Flags override `KPIF_*` environment settings.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_HORIZON, MAX_HORIZON, MIN_HORIZON};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "kpif", version, about = "Monthly telecom KPI forecaster")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG / KPIF_LOG say otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast one KPI series from a ZIP of monthly spreadsheet exports.
    Forecast(ForecastArgs),
    /// List what an archive contains: per-file outcomes and category tuples.
    Inspect(InspectArgs),
}

/// Options shared by every command that reads an archive.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// ZIP archive of monthly exports (file names like `Jan2023.xlsx`).
    #[arg(short, long, value_name = "ZIP")]
    pub archive: PathBuf,

    /// Column holding the KPI value (default: KPIF_VALUE_COLUMN or "Actual Value MAPS Networks").
    #[arg(long, value_name = "NAME")]
    pub value_column: Option<String>,

    /// Parent directory for temporary workspaces (default: KPIF_WORK_DIR or the system temp dir).
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long)]
    pub country: String,

    #[arg(long)]
    pub technology: String,

    #[arg(long)]
    pub zone: String,

    #[arg(long)]
    pub kpi: String,

    /// Months to forecast beyond the last observation.
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_HORIZON,
        value_parser = clap::value_parser!(u32).range(MIN_HORIZON as i64..=MAX_HORIZON as i64)
    )]
    pub months: u32,

    /// Write the Plotly chart JSON here.
    #[arg(long, value_name = "JSON")]
    pub export_chart: Option<PathBuf>,

    /// Write the `{plot, summary, hints}` / `{error}` response JSON here.
    #[arg(long, value_name = "JSON")]
    pub export_response: Option<PathBuf>,

    /// Print the response JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_defaults() {
        let cli = Cli::try_parse_from([
            "kpif", "forecast", "--archive", "kpis.zip", "--country", "Kenya", "--technology", "4G", "--zone",
            "North", "--kpi", "Drop call rate",
        ])
        .unwrap();

        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.months, 3);
        assert_eq!(args.kpi, "Drop call rate");
        assert!(!args.json && !cli.verbose);
        assert_eq!(args.source.value_column, None);
    }

    #[test]
    fn months_outside_range_are_rejected() {
        for months in ["0", "13"] {
            let res = Cli::try_parse_from([
                "kpif", "forecast", "-a", "k.zip", "--country", "A", "--technology", "B", "--zone", "C", "--kpi",
                "D", "--months", months,
            ]);
            assert!(res.is_err(), "months={months} should be rejected");
        }
    }

    #[test]
    fn inspect_takes_global_verbose() {
        let cli = Cli::try_parse_from(["kpif", "inspect", "--archive", "k.zip", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Inspect(_)));
    }
}
