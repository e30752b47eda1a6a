//! Shared pipeline logic used by the `forecast` and `inspect` commands.
//!
//! archive bytes -> workspace -> spreadsheets -> dataset -> series -> forecast
//!
//! Each stage either hands its output to the next or short-circuits with an
//! `AppError`. The workspace is removed on every path out of the pipeline.

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::domain::{Dataset, ForecastPoint, ForecastRequest, LoadedFile, SkippedFile, TimeSeries};
use crate::error::AppError;
use crate::forecast::{ForecastEngine, run_forecast};
use crate::io::{Workspace, load_dataset, unpack_archive};
use crate::report::chart::ChartSpec;
use crate::report::hints::kpi_drivers;
use crate::series::{CategorySummary, build_series, category_summaries};

/// Ingestion counters reported alongside a forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub spreadsheets: usize,
    pub loaded: Vec<LoadedFile>,
    pub skipped: Vec<SkippedFile>,
    pub records: usize,
    pub engine: String,
}

/// Everything a successful forecast run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastReport {
    pub request: ForecastRequest,
    pub series: TimeSeries,
    pub forecast: Vec<ForecastPoint>,
    pub chart: ChartSpec,
    pub summary: String,
    pub hints: Vec<String>,
    pub stats: RunStats,
}

/// Portable result: `{plot, summary, hints}` on success, `{error}` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<ChartSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Result<ForecastReport, AppError>> for PipelineResponse {
    fn from(result: &Result<ForecastReport, AppError>) -> Self {
        match result {
            Ok(report) => Self {
                plot: Some(report.chart.clone()),
                summary: Some(report.summary.clone()),
                hints: report.hints.clone(),
                error: None,
            },
            Err(err) => Self {
                plot: None,
                summary: None,
                hints: Vec::new(),
                error: Some(err.to_string()),
            },
        }
    }
}

impl From<Result<ForecastReport, AppError>> for PipelineResponse {
    fn from(result: Result<ForecastReport, AppError>) -> Self {
        Self::from(&result)
    }
}

/// Run the full pipeline on one uploaded archive.
pub fn run_pipeline(
    archive: &[u8],
    request: &ForecastRequest,
    config: &PipelineConfig,
    engine: &dyn ForecastEngine,
) -> Result<ForecastReport, AppError> {
    tracing::info!(
        bytes = archive.len(),
        filter = %request.filter,
        horizon = request.horizon.months(),
        engine = engine.name(),
        "pipeline started"
    );

    let result = reject_empty(archive).and_then(|()| {
        with_workspace(config, |workspace| {
            let files = unpack_archive(archive, workspace)?;
            let spreadsheets = files.len();
            let dataset = load_dataset(&files)?;
            forecast_dataset(dataset, spreadsheets, request, config, engine)
        })
    });

    log_outcome(&result);
    result
}

/// Forecast from an already assembled dataset.
pub fn forecast_dataset(
    dataset: Dataset,
    spreadsheets: usize,
    request: &ForecastRequest,
    config: &PipelineConfig,
    engine: &dyn ForecastEngine,
) -> Result<ForecastReport, AppError> {
    let series = build_series(
        &dataset,
        &request.filter,
        &config.category_columns,
        &config.value_column,
    )?;
    let outcome = run_forecast(&series, request.horizon, &request.filter, engine)?;

    let hints = kpi_drivers(&request.filter.kpi)
        .iter()
        .map(|s| s.to_string())
        .collect();

    Ok(ForecastReport {
        request: request.clone(),
        series,
        forecast: outcome.points,
        chart: outcome.chart,
        summary: outcome.summary,
        hints,
        stats: RunStats {
            spreadsheets,
            records: dataset.len(),
            loaded: dataset.loaded,
            skipped: dataset.skipped,
            engine: engine.name().to_string(),
        },
    })
}

/// What an archive contains, without forecasting.
#[derive(Debug, Clone)]
pub struct InspectReport {
    pub spreadsheets: usize,
    pub dataset: Dataset,
    pub categories: Vec<CategorySummary>,
}

/// Ingest and assemble an archive, then list its category tuples.
pub fn inspect_archive(archive: &[u8], config: &PipelineConfig) -> Result<InspectReport, AppError> {
    reject_empty(archive)?;
    let result = with_workspace(config, |workspace| {
        let files = unpack_archive(archive, workspace)?;
        let dataset = load_dataset(&files)?;
        let categories = category_summaries(&dataset, &config.category_columns);
        Ok(InspectReport {
            spreadsheets: files.len(),
            dataset,
            categories,
        })
    });

    if let Err(err @ AppError::Pipeline(_)) = &result {
        tracing::error!(error = %err, "inspect failed");
    }
    result
}

fn reject_empty(archive: &[u8]) -> Result<(), AppError> {
    if archive.is_empty() {
        return Err(AppError::input("No archive uploaded (empty upload)"));
    }
    Ok(())
}

/// Run `f` inside a fresh workspace and remove the workspace afterwards.
fn with_workspace<T>(
    config: &PipelineConfig,
    f: impl FnOnce(&Workspace) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let workspace = Workspace::create(config.work_root.as_deref())?;
    let result = f(&workspace);

    let path = workspace.path().to_path_buf();
    if let Err(e) = workspace.close() {
        tracing::warn!(path = %path.display(), error = %e, "workspace cleanup failed");
    }
    result
}

fn log_outcome(result: &Result<ForecastReport, AppError>) {
    match result {
        Ok(report) => tracing::info!(points = report.forecast.len(), "pipeline finished"),
        Err(err @ AppError::Pipeline(_)) => tracing::error!(error = %err, "pipeline failed"),
        Err(err) => tracing::warn!(category = err.category(), error = %err, "request rejected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_has_only_error() {
        let response = PipelineResponse::from(Err::<ForecastReport, _>(AppError::input("No data for selected inputs")));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"error": "No data for selected inputs"}));
    }
}
