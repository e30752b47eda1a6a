//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - layers CLI flags over the environment configuration
//! - runs the pipeline
//! - prints reports/plots and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ForecastArgs, InspectArgs, SourceArgs};
use crate::config::PipelineConfig;
use crate::domain::{CategoryFilter, ForecastHorizon, ForecastRequest};
use crate::error::AppError;
use crate::forecast::TrendSeasonalEngine;

pub mod pipeline;

use pipeline::PipelineResponse;

/// Entry point for the `kpif` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Inspect(args) => handle_inspect(args),
    }
}

/// Log to stderr. `RUST_LOG` wins, then `KPIF_LOG`, then the built-in default.
fn init_tracing(verbose: bool) {
    let default = if verbose { "kpi_forecast=debug" } else { "kpi_forecast=info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("KPIF_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Environment config with CLI overrides applied.
pub fn config_from_args(source: &SourceArgs) -> Result<PipelineConfig, AppError> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(column) = &source.value_column {
        config.value_column = column.clone();
    }
    if let Some(dir) = &source.work_dir {
        config.work_root = Some(dir.clone());
    }
    Ok(config)
}

pub fn request_from_args(args: &ForecastArgs) -> Result<ForecastRequest, AppError> {
    Ok(ForecastRequest {
        filter: CategoryFilter {
            country: args.country.clone(),
            technology: args.technology.clone(),
            zone: args.zone.clone(),
            kpi: args.kpi.clone(),
        },
        horizon: ForecastHorizon::new(args.months)?,
    })
}

fn read_archive(source: &SourceArgs) -> Result<Vec<u8>, AppError> {
    std::fs::read(&source.archive)
        .map_err(|e| AppError::input(format!("Failed to read archive '{}': {e}", source.archive.display())))
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.source)?;
    let request = request_from_args(&args)?;
    let archive = read_archive(&args.source)?;
    let engine = TrendSeasonalEngine::new(config.engine.clone());

    let result = pipeline::run_pipeline(&archive, &request, &config, &engine);
    let response = PipelineResponse::from(&result);

    // Exports reflect the outcome, error included.
    if let Some(path) = &args.export_response {
        crate::io::export::write_response_json(path, &response)?;
    }

    if args.json {
        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| AppError::pipeline(format!("failed to serialize response: {e}")))?;
        println!("{json}");
        return result.map(|_| ());
    }

    let report = result?;

    if let Some(path) = &args.export_chart {
        crate::io::export::write_chart_json(path, &report.chart)?;
    }

    println!("{}", crate::report::format_run_summary(&report));
    println!("Summary:\n{}\n", report.summary);

    if !args.no_plot {
        let plot = crate::plot::render_forecast_plot(&report.series, &report.forecast, args.width, args.height);
        println!("{plot}");
    }

    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.source)?;
    let archive = read_archive(&args.source)?;

    let report = pipeline::inspect_archive(&archive, &config)?;
    println!("{}", crate::report::format_inspect(&report));
    Ok(())
}
