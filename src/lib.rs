//! `kpi-forecast` library crate.
//!
//! Turns a ZIP of monthly KPI spreadsheet exports into a short-horizon
//! forecast for one (country, technology, zone, KPI) series, with a
//! Plotly-compatible chart and a plain-text summary.
//!
//! The binary (`kpif`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pipeline can sit behind another front end (for example an HTTP
//!   handler using `AppError::http_status`)

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod series;
