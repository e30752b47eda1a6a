//! Categorical filtering and monthly series construction.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{CategoryColumns, CategoryFilter, Dataset, Observation, TimeSeries};
use crate::error::AppError;

/// Filter the dataset to one category tuple and average the value column per month.
///
/// Checks, in order:
/// 1. at least one record matches all four category fields exactly
/// 2. the value column exists somewhere in the dataset
/// 3. at least one matching record carries a numeric value
pub fn build_series(
    dataset: &Dataset,
    filter: &CategoryFilter,
    columns: &CategoryColumns,
    value_column: &str,
) -> Result<TimeSeries, AppError> {
    let matching: Vec<_> = dataset
        .records
        .iter()
        .filter(|r| columns.matches(r, filter))
        .collect();

    if matching.is_empty() {
        return Err(AppError::input(format!("No data for selected inputs ({filter})")));
    }

    if !dataset.has_column(value_column) {
        return Err(AppError::input(format!("Expected value column not found: '{value_column}'")));
    }

    let mut by_month: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in &matching {
        if let Some(value) = record.get(value_column).and_then(|c| c.as_f64()) {
            let slot = by_month.entry(record.date()).or_insert((0.0, 0));
            slot.0 += value;
            slot.1 += 1;
        }
    }

    if by_month.is_empty() {
        return Err(AppError::input(format!(
            "No numeric values in column '{value_column}' for selected inputs"
        )));
    }

    let observations: Vec<Observation> = by_month
        .into_iter()
        .map(|(date, (sum, count))| Observation {
            date,
            value: sum / count as f64,
        })
        .collect();

    tracing::info!(
        matched_rows = matching.len(),
        months = observations.len(),
        "series built"
    );
    TimeSeries::new(observations)
}

/// Rows and month span for one distinct category tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: CategoryFilter,
    pub rows: usize,
    pub first: NaiveDate,
    pub last: NaiveDate,
}

/// Distinct category tuples in the dataset, sorted.
///
/// Records missing any of the four text fields are not counted.
pub fn category_summaries(dataset: &Dataset, columns: &CategoryColumns) -> Vec<CategorySummary> {
    let mut map: BTreeMap<CategoryFilter, CategorySummary> = BTreeMap::new();

    for record in &dataset.records {
        let Some(category) = columns.extract(record) else {
            continue;
        };
        let date = record.date();
        map.entry(category.clone())
            .and_modify(|s| {
                s.rows += 1;
                s.first = s.first.min(date);
                s.last = s.last.max(date);
            })
            .or_insert(CategorySummary {
                category,
                rows: 1,
                first: date,
                last: date,
            });
    }

    map.into_values().collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;
    use crate::domain::{CellValue, KpiRecord};

    const VALUE: &str = "Actual Value MAPS Networks";

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn record(date: NaiveDate, kpi: &str, value: CellValue) -> KpiRecord {
        let mut fields = HashMap::new();
        fields.insert("Country".to_string(), CellValue::Text("Kenya".to_string()));
        fields.insert("Technology".to_string(), CellValue::Text("4G".to_string()));
        fields.insert("Zone".to_string(), CellValue::Text("North".to_string()));
        fields.insert("KPI".to_string(), CellValue::Text(kpi.to_string()));
        fields.insert(VALUE.to_string(), value);
        KpiRecord::new(fields, date, format!("{}.csv", date.format("%b%Y")))
    }

    fn dataset(records: Vec<KpiRecord>) -> Dataset {
        Dataset {
            records,
            columns: ["Country", "Technology", "Zone", "KPI", VALUE, "Date", "SourceFile"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..Dataset::default()
        }
    }

    fn filter(kpi: &str) -> CategoryFilter {
        CategoryFilter {
            country: "Kenya".to_string(),
            technology: "4G".to_string(),
            zone: "North".to_string(),
            kpi: kpi.to_string(),
        }
    }

    #[test]
    fn duplicate_months_are_averaged_and_sorted() {
        let ds = dataset(vec![
            record(ymd(2023, 3), "Drop call rate", CellValue::Number(3.0)),
            record(ymd(2023, 1), "Drop call rate", CellValue::Number(1.0)),
            record(ymd(2023, 1), "Drop call rate", CellValue::Text("2.0".to_string())),
            record(ymd(2023, 1), "Drop call rate", CellValue::Text("n/a".to_string())),
            record(ymd(2023, 2), "Block call rate", CellValue::Number(50.0)),
        ]);

        let series = build_series(&ds, &filter("Drop call rate"), &CategoryColumns::default(), VALUE).unwrap();
        assert_eq!(series.dates(), vec![ymd(2023, 1), ymd(2023, 3)]);
        assert_eq!(series.values(), vec![1.5, 3.0]);
    }

    #[test]
    fn filter_miss_is_reported_before_missing_column() {
        let ds = dataset(vec![record(ymd(2023, 1), "Drop call rate", CellValue::Number(1.0))]);
        let err = build_series(&ds, &filter("drop call rate"), &CategoryColumns::default(), "Other").unwrap_err();
        assert_matches!(err, AppError::Input(msg) if msg.starts_with("No data for selected inputs"));
    }

    #[test]
    fn missing_value_column_is_an_input_error() {
        let ds = dataset(vec![record(ymd(2023, 1), "Drop call rate", CellValue::Number(1.0))]);
        let err = build_series(&ds, &filter("Drop call rate"), &CategoryColumns::default(), "Other").unwrap_err();
        assert_eq!(err, AppError::input("Expected value column not found: 'Other'"));
    }

    #[test]
    fn non_numeric_values_only_is_an_input_error() {
        let ds = dataset(vec![record(ymd(2023, 1), "Drop call rate", CellValue::Empty)]);
        let err = build_series(&ds, &filter("Drop call rate"), &CategoryColumns::default(), VALUE).unwrap_err();
        assert_matches!(err, AppError::Input(msg) if msg.starts_with("No numeric values"));
    }

    #[test]
    fn summaries_group_by_tuple() {
        let ds = dataset(vec![
            record(ymd(2023, 2), "Drop call rate", CellValue::Number(1.0)),
            record(ymd(2023, 1), "Drop call rate", CellValue::Number(1.0)),
            record(ymd(2023, 5), "Block call rate", CellValue::Number(1.0)),
        ]);
        let summaries = category_summaries(&ds, &CategoryColumns::default());

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].category.kpi, "Block call rate");
        assert_eq!(summaries[1].rows, 2);
        assert_eq!((summaries[1].first, summaries[1].last), (ymd(2023, 1), ymd(2023, 2)));
    }
}
