//! Spreadsheet reading and per-file normalization.
//!
//! Each file becomes either a set of dated records or a skip with a reason.
//! Nothing here returns an error that crosses the file boundary: one broken
//! export must not block the rest of the batch.
//!
//! Normalization rules:
//! - first sheet only; first row is the header row
//! - header names are trimmed (a UTF-8 BOM is dropped too), blank headers
//!   become `Unnamed: <index>`, repeated headers get a `.N` suffix
//! - fully empty rows are dropped
//! - cell text is kept verbatim so category matching stays exact

use std::collections::{HashMap, HashSet};
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDate;

use crate::domain::{CellValue, KpiRecord, LoadedFile, SOURCE_FILE_FIELD, DATE_FIELD, SkipReason, SkippedFile};
use crate::io::filename::resolve_month;

/// Header + rows of one sheet, before dating.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Result of extracting one file.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Loaded {
        summary: LoadedFile,
        /// Sheet columns, normalized, without the synthesized fields.
        columns: Vec<String>,
        records: Vec<KpiRecord>,
    },
    Skipped(SkippedFile),
}

/// Read, normalize and date one spreadsheet.
pub fn extract_file(path: &Path) -> FileOutcome {
    let file = base_name(path);
    let skipped = |reason| FileOutcome::Skipped(SkippedFile { file: file.clone(), reason });

    let Some(date) = resolve_month(&file) else {
        return skipped(SkipReason::NoDate);
    };

    let table = match read_table(path) {
        Ok(table) => table,
        Err(e) => return skipped(SkipReason::Unreadable(e)),
    };

    let records = table_to_records(&table, date, &file);
    if records.is_empty() {
        return skipped(SkipReason::Empty);
    }

    let columns = table
        .headers
        .iter()
        .filter(|h| h.as_str() != DATE_FIELD && h.as_str() != SOURCE_FILE_FIELD)
        .cloned()
        .collect();

    FileOutcome::Loaded {
        summary: LoadedFile {
            file,
            date,
            rows: records.len(),
        },
        columns,
        records,
    }
}

/// Read the first sheet of a workbook or a CSV export.
pub fn read_table(path: &Path) -> Result<RawTable, String> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv { read_csv(path) } else { read_workbook(path) }
}

fn read_workbook(path: &Path) -> Result<RawTable, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no sheets".to_string())?
        .map_err(|e| e.to_string())?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable {
            headers: Vec::new(),
            rows: Vec::new(),
        });
    };

    let headers = normalize_headers(header_row.iter().map(|c| c.to_string()));
    let rows = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn read_csv(path: &Path) -> Result<RawTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    let headers = normalize_headers(
        reader
            .headers()
            .map_err(|e| format!("failed to read CSV headers: {e}"))?
            .iter()
            .map(str::to_string),
    );

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| format!("CSV parse error: {e}"))?;
        rows.push(
            record
                .iter()
                .map(|s| {
                    if s.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(s.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Dates, durations and error cells keep their display form.
        other => CellValue::Text(other.to_string()),
    }
}

fn normalize_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for (idx, name) in raw.enumerate() {
        let name = name.trim().trim_start_matches('\u{feff}').trim().to_string();
        let base = if name.is_empty() { format!("Unnamed: {idx}") } else { name };

        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

fn table_to_records(table: &RawTable, date: NaiveDate, file: &str) -> Vec<KpiRecord> {
    table
        .rows
        .iter()
        .filter(|row| !row.iter().all(CellValue::is_empty))
        .map(|row| {
            let fields: HashMap<String, CellValue> = table
                .headers
                .iter()
                .zip(row.iter())
                .map(|(h, c)| (h.clone(), c.clone()))
                .collect();
            KpiRecord::new(fields, date, file)
        })
        .collect()
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
