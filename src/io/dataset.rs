//! Dataset assembly: per-file outcomes into one unified dataset.

use std::collections::HashSet;
use std::path::PathBuf;

use rayon::prelude::*;

use crate::domain::{DATE_FIELD, Dataset, SOURCE_FILE_FIELD};
use crate::error::AppError;
use crate::io::sheet::{FileOutcome, extract_file};

/// Extract every file in parallel. Output order matches `paths`.
pub fn extract_all(paths: &[PathBuf]) -> Vec<FileOutcome> {
    paths.par_iter().map(|p| extract_file(p)).collect()
}

/// Concatenate loaded files in order; keep skips for diagnostics.
pub fn assemble(outcomes: Vec<FileOutcome>) -> Result<Dataset, AppError> {
    let mut dataset = Dataset::default();
    let mut seen_columns: HashSet<String> = HashSet::new();

    for outcome in outcomes {
        match outcome {
            FileOutcome::Loaded {
                summary,
                columns,
                records,
            } => {
                tracing::debug!(file = %summary.file, date = %summary.date, rows = summary.rows, "file loaded");
                for column in columns {
                    if seen_columns.insert(column.clone()) {
                        dataset.columns.push(column);
                    }
                }
                dataset.records.extend(records);
                dataset.loaded.push(summary);
            }
            FileOutcome::Skipped(skip) => {
                tracing::warn!(file = %skip.file, reason = %skip.reason, "file skipped");
                dataset.skipped.push(skip);
            }
        }
    }

    if dataset.records.is_empty() {
        return Err(AppError::input("No valid data found in spreadsheet files"));
    }

    dataset.columns.push(DATE_FIELD.to_string());
    dataset.columns.push(SOURCE_FILE_FIELD.to_string());

    tracing::info!(
        files_loaded = dataset.loaded.len(),
        files_skipped = dataset.skipped.len(),
        records = dataset.records.len(),
        "dataset assembled"
    );
    Ok(dataset)
}

/// Extract and assemble in one step.
pub fn load_dataset(paths: &[PathBuf]) -> Result<Dataset, AppError> {
    assemble(extract_all(paths))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::SkipReason;

    #[test]
    fn files_concatenate_in_enumeration_order() {
        let dir = tempfile::tempdir().unwrap();
        let feb = dir.path().join("Feb2023.csv");
        let jan = dir.path().join("Jan2023.csv");
        let notes = dir.path().join("notes.csv");
        fs::write(&feb, "Country,Extra\nA,1\nB,2\n").unwrap();
        fs::write(&jan, "Country,Other\nC,3\n").unwrap();
        fs::write(&notes, "Country\nZ\n").unwrap();

        let dataset = load_dataset(&[feb, notes, jan]).unwrap();

        let sources: Vec<&str> = dataset.records.iter().map(|r| r.source_file()).collect();
        assert_eq!(sources, vec!["Feb2023.csv", "Feb2023.csv", "Jan2023.csv"]);
        assert_eq!(dataset.columns, vec!["Country", "Extra", "Other", "Date", "SourceFile"]);
        assert_eq!(dataset.records[2].date(), NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(dataset.skipped.len(), 1);
        assert_eq!(dataset.skipped[0].reason, SkipReason::NoDate);
        assert_eq!(dataset.loaded.len(), 2);
    }

    #[test]
    fn nothing_loaded_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("Jan2023.xlsx");
        let undated = dir.path().join("summary.csv");
        fs::write(&broken, b"garbage").unwrap();
        fs::write(&undated, "Country\nA\n").unwrap();

        let err = load_dataset(&[broken, undated]).unwrap_err();
        assert_matches!(err, AppError::Input(msg) if msg.contains("No valid data found"));
    }
}
