//! Reporting: chart specification, KPI hints, and terminal formatting.

pub mod chart;
pub mod format;
pub mod hints;

pub use chart::{ChartSpec, TraceRole, build_chart};
pub use format::{format_inspect, format_run_summary};
pub use hints::kpi_drivers;
