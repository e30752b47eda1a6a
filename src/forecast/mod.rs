//! Forecasting: engine trait, built-in engine, and orchestration.

pub mod engine;
pub mod orchestrator;
pub mod trend;

pub use engine::{EngineError, EngineOutput, EnginePoint, ForecastEngine};
pub use orchestrator::{ForecastOutcome, format_summary, run_forecast};
pub use trend::TrendSeasonalEngine;
