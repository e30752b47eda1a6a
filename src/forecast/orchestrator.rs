//! Forecast orchestration: engine call, output clean-up, chart and summary.
//!
//! Engines return points for history and future alike, possibly unsorted,
//! with duplicates or swapped bounds. The orchestrator turns that into exactly
//! `horizon` ascending future points with `lower <= estimate <= upper`.

use chrono::NaiveDate;

use crate::domain::{CategoryFilter, ForecastHorizon, ForecastPoint, TimeSeries};
use crate::error::AppError;
use crate::forecast::engine::{EnginePoint, ForecastEngine, add_months};
use crate::report::chart::{ChartSpec, build_chart};

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    pub points: Vec<ForecastPoint>,
    pub chart: ChartSpec,
    pub summary: String,
}

pub fn run_forecast(
    series: &TimeSeries,
    horizon: ForecastHorizon,
    filter: &CategoryFilter,
    engine: &dyn ForecastEngine,
) -> Result<ForecastOutcome, AppError> {
    let last = series
        .last_date()
        .ok_or_else(|| AppError::forecast("empty time series"))?;

    let output = engine
        .forecast(series, horizon.periods())
        .map_err(AppError::forecast)?;
    tracing::debug!(engine = engine.name(), points = output.points.len(), "engine returned");

    let points = future_points(output.points, last, horizon.periods())?;
    let chart = build_chart(series, &points, filter);
    let summary = format_summary(&points);

    tracing::info!(
        engine = engine.name(),
        horizon = horizon.months(),
        first = %points[0].date,
        "forecast complete"
    );
    Ok(ForecastOutcome { points, chart, summary })
}

/// Keep exactly `periods` future points after `last`.
fn future_points(mut raw: Vec<EnginePoint>, last: NaiveDate, periods: usize) -> Result<Vec<ForecastPoint>, AppError> {
    raw.sort_by_key(|p| p.date);

    let mut points: Vec<ForecastPoint> = Vec::with_capacity(periods);
    for p in raw.into_iter().filter(|p| p.date > last) {
        if points.last().is_some_and(|prev| prev.date == p.date) {
            continue;
        }
        if points.len() == periods {
            break;
        }
        points.push(ordered(p)?);
    }

    let Some(&tail) = points.last() else {
        return Err(AppError::forecast("engine produced no points after the last observation"));
    };

    if points.len() < periods {
        tracing::warn!(
            got = points.len(),
            wanted = periods,
            "engine returned a short forecast; carrying the last point forward"
        );
        for step in 1..=(periods - points.len()) as u32 {
            let date = add_months(tail.date, step)
                .ok_or_else(|| AppError::forecast(format!("date overflow after {}", tail.date)))?;
            points.push(ForecastPoint { date, ..tail });
        }
    }

    Ok(points)
}

/// Keep the estimate as given and widen the bounds until they enclose it.
fn ordered(p: EnginePoint) -> Result<ForecastPoint, AppError> {
    if !(p.estimate.is_finite() && p.lower.is_finite() && p.upper.is_finite()) {
        return Err(AppError::forecast(format!(
            "non-finite value at {} (estimate={}, lower={}, upper={})",
            p.date, p.estimate, p.lower, p.upper
        )));
    }
    Ok(ForecastPoint {
        date: p.date,
        estimate: p.estimate,
        lower: p.lower.min(p.upper).min(p.estimate),
        upper: p.upper.max(p.lower).max(p.estimate),
    })
}

/// One `YYYY-MM-DD: value` line per point.
pub fn format_summary(points: &[ForecastPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{}: {:.2}", p.date.format("%Y-%m-%d"), p.estimate))
        .collect::<Vec<_>>()
        .join("\n")
}
