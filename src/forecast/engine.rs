//! Forecasting engine abstraction.
//!
//! An engine receives the observed monthly series and the number of future
//! periods wanted, and returns estimates with an uncertainty interval for
//! every date it covers (history included). The orchestrator decides which of
//! those points make it into the result.

use chrono::{Datelike, Months, NaiveDate};
use thiserror::Error;

use crate::domain::TimeSeries;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("{0}")]
    Computation(String),

    #[error("non-finite estimate: {0}")]
    NonFinite(String),
}

/// One estimated month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnginePoint {
    pub date: NaiveDate,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Raw engine output, in whatever order the engine produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOutput {
    pub points: Vec<EnginePoint>,
}

pub trait ForecastEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Predict `periods` month starts beyond the last observation.
    fn forecast(&self, series: &TimeSeries, periods: usize) -> Result<EngineOutput, EngineError>;
}

/// First day of the month `n` months after `date`'s month.
pub fn add_months(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    month_start(date).checked_add_months(Months::new(n))
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Whole months from `from` to `to` (negative if `to` is earlier).
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn month_arithmetic_crosses_years() {
        assert_eq!(add_months(ymd(2023, 11), 3), Some(ymd(2024, 2)));
        assert_eq!(add_months(NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(), 1), Some(ymd(2023, 2)));
        assert_eq!(months_between(ymd(2022, 11), ymd(2024, 2)), 15);
        assert_eq!(months_between(ymd(2024, 2), ymd(2024, 1)), -1);
    }

    #[test]
    fn insufficient_data_message_names_counts() {
        let err = EngineError::InsufficientData { needed: 2, got: 1 };
        assert_eq!(err.to_string(), "insufficient data: need at least 2 observations, got 1");
    }
}
