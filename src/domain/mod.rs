//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - spreadsheet rows and the unified dataset (`KpiRecord`, `Dataset`)
//! - request types (`CategoryFilter`, `ForecastHorizon`, `ForecastRequest`)
//! - series and forecast outputs (`TimeSeries`, `ForecastPoint`)

pub mod types;

pub use types::*;
