//! JSON exports of the chart and the portable response.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::PipelineResponse;
use crate::error::AppError;
use crate::report::chart::ChartSpec;

/// Write the Plotly figure (`{data, layout}`) as pretty JSON.
pub fn write_chart_json(path: &Path, chart: &ChartSpec) -> Result<(), AppError> {
    write_json(path, chart, "chart")
}

/// Write `{plot, summary, hints}` or `{error}` as pretty JSON.
pub fn write_response_json(path: &Path, response: &PipelineResponse) -> Result<(), AppError> {
    write_json(path, response, "response")
}

fn write_json<T: Serialize>(path: &Path, value: &T, what: &str) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::pipeline(format!("failed to create {what} JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| AppError::pipeline(format!("failed to write {what} JSON: {e}")))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| AppError::pipeline(format!("failed to write {what} JSON: {e}")))?;

    tracing::debug!(path = %path.display(), what, "JSON written");
    Ok(())
}
