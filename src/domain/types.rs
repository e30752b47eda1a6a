//! Shared domain types.
//!
//! Everything here is created fresh per request and dropped when the request
//! completes. Types that end up in the portable result are serializable.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Name of the synthesized date field.
pub const DATE_FIELD: &str = "Date";
/// Name of the synthesized originating-file field.
pub const SOURCE_FILE_FIELD: &str = "SourceFile";

/// Smallest and largest accepted forecast horizon (months).
pub const MIN_HORIZON: u32 = 1;
pub const MAX_HORIZON: u32 = 12;
pub const DEFAULT_HORIZON: u32 = 3;

/// One spreadsheet cell after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Text content, only for text cells. Category matching goes through this,
    /// so numbers never equal strings.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Finite numeric value: numbers, or text that parses as a number.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            CellValue::Number(v) => *v,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Empty | CellValue::Bool(_) => return None,
        };
        v.is_finite().then_some(v)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// One row from one spreadsheet, stamped with its resolved month and file.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiRecord {
    fields: HashMap<String, CellValue>,
    date: NaiveDate,
    source_file: String,
}

impl KpiRecord {
    /// Build a record. Sheet columns named like the synthesized fields are
    /// replaced by the synthesized values.
    pub fn new(mut fields: HashMap<String, CellValue>, date: NaiveDate, source_file: impl Into<String>) -> Self {
        fields.remove(DATE_FIELD);
        fields.remove(SOURCE_FILE_FIELD);
        Self {
            fields,
            date,
            source_file: source_file.into(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields.get(column)
    }

    /// Exact string equality against a text cell.
    pub fn text_equals(&self, column: &str, expected: &str) -> bool {
        self.get(column).and_then(CellValue::as_text) == Some(expected)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }
}

/// Why a file contributed no records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No `<Mon><YYYY>` token in the file name.
    NoDate,
    /// The file could not be read as a spreadsheet.
    Unreadable(String),
    /// Header only, or nothing at all.
    Empty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoDate => f.write_str("no month/year token in file name"),
            SkipReason::Unreadable(e) => write!(f, "unreadable: {e}"),
            SkipReason::Empty => f.write_str("no data rows"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub file: String,
    pub reason: SkipReason,
}

/// Per-file summary kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub file: String,
    pub date: NaiveDate,
    pub rows: usize,
}

/// All records from one upload, in file enumeration order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<KpiRecord>,
    /// Union of column names, first-seen order, synthesized fields last.
    pub columns: Vec<String>,
    pub loaded: Vec<LoadedFile>,
    pub skipped: Vec<SkippedFile>,
}

impl Dataset {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The (country, technology, zone, KPI) tuple identifying one series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub country: String,
    pub technology: String,
    pub zone: String,
    pub kpi: String,
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "country={:?}, technology={:?}, zone={:?}, kpi={:?}",
            self.country, self.technology, self.zone, self.kpi
        )
    }
}

/// Column names carrying the four category fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryColumns {
    pub country: String,
    pub technology: String,
    pub zone: String,
    pub kpi: String,
}

impl Default for CategoryColumns {
    fn default() -> Self {
        Self {
            country: "Country".to_string(),
            technology: "Technology".to_string(),
            zone: "Zone".to_string(),
            kpi: "KPI".to_string(),
        }
    }
}

impl CategoryColumns {
    pub fn matches(&self, record: &KpiRecord, filter: &CategoryFilter) -> bool {
        record.text_equals(&self.country, &filter.country)
            && record.text_equals(&self.technology, &filter.technology)
            && record.text_equals(&self.zone, &filter.zone)
            && record.text_equals(&self.kpi, &filter.kpi)
    }

    /// Read the tuple out of a record, if all four fields are text.
    pub fn extract(&self, record: &KpiRecord) -> Option<CategoryFilter> {
        let field = |name: &str| record.get(name).and_then(CellValue::as_text).map(str::to_string);
        Some(CategoryFilter {
            country: field(&self.country)?,
            technology: field(&self.technology)?,
            zone: field(&self.zone)?,
            kpi: field(&self.kpi)?,
        })
    }
}

/// Number of future monthly periods to predict, validated to 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ForecastHorizon(u32);

impl ForecastHorizon {
    pub fn new(months: u32) -> Result<Self, AppError> {
        if !(MIN_HORIZON..=MAX_HORIZON).contains(&months) {
            return Err(AppError::input(format!(
                "forecast_months must be between {MIN_HORIZON} and {MAX_HORIZON} (got {months})"
            )));
        }
        Ok(Self(months))
    }

    pub fn months(self) -> u32 {
        self.0
    }

    pub fn periods(self) -> usize {
        self.0 as usize
    }
}

impl Default for ForecastHorizon {
    fn default() -> Self {
        Self(DEFAULT_HORIZON)
    }
}

/// A validated forecast request: which series, how far ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub filter: CategoryFilter,
    pub horizon: ForecastHorizon,
}

/// One observed month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Monthly series with strictly increasing dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    observations: Vec<Observation>,
}

impl TimeSeries {
    pub fn new(observations: Vec<Observation>) -> Result<Self, AppError> {
        if let Some(pair) = observations.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(AppError::pipeline(format!(
                "time series dates must be strictly increasing ({} then {})",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { observations })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// One predicted future month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}
