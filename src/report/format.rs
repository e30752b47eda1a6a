//! Formatted terminal output for forecast and inspect runs.
//!
//! We keep formatting code in one place so:
//! - pipeline code stays free of presentation details
//! - output changes are localized

use crate::app::pipeline::{ForecastReport, InspectReport};
use crate::domain::{LoadedFile, SkippedFile};

/// Run summary: request, ingestion counters, and the forecast table.
pub fn format_run_summary(report: &ForecastReport) -> String {
    let mut out = String::new();
    let filter = &report.request.filter;
    let stats = &report.stats;

    out.push_str("=== kpif - KPI Forecast ===\n");
    out.push_str(&format!("KPI: {}\n", filter.kpi));
    out.push_str(&format!(
        "Scope: country={} | technology={} | zone={}\n",
        filter.country, filter.technology, filter.zone
    ));
    out.push_str(&format!(
        "Files: {} spreadsheets | {} loaded | {} skipped | {} rows\n",
        stats.spreadsheets,
        stats.loaded.len(),
        stats.skipped.len(),
        stats.records
    ));
    for skip in &stats.skipped {
        out.push_str(&format_skip(skip));
    }

    match (report.series.first_date(), report.series.last_date()) {
        (Some(first), Some(last)) => out.push_str(&format!(
            "History: {} months | {first} .. {last}\n",
            report.series.len()
        )),
        _ => out.push_str("History: empty\n"),
    }
    out.push_str(&format!(
        "Engine: {} | horizon={} months\n",
        stats.engine,
        report.request.horizon.months()
    ));

    out.push_str("\nForecast:\n");
    out.push_str(&format!("{:<12} {:>12} {:>12} {:>12}\n", "date", "estimate", "lower", "upper"));
    out.push_str(&format!("{:-<12} {:-<12} {:-<12} {:-<12}\n", "", "", "", ""));
    for p in &report.forecast {
        out.push_str(&format!(
            "{:<12} {:>12.2} {:>12.2} {:>12.2}\n",
            p.date.format("%Y-%m-%d"),
            p.estimate,
            p.lower,
            p.upper
        ));
    }

    if !report.hints.is_empty() {
        out.push_str(&format!("\nCommon drivers for {}: {}\n", filter.kpi, report.hints.join(", ")));
    }

    out
}

/// Per-file outcomes and distinct category tuples.
pub fn format_inspect(report: &InspectReport) -> String {
    let mut out = String::new();
    let dataset = &report.dataset;

    out.push_str(&format!(
        "Files: {} spreadsheets | {} loaded | {} skipped | {} rows\n",
        report.spreadsheets,
        dataset.loaded.len(),
        dataset.skipped.len(),
        dataset.len()
    ));
    for file in &dataset.loaded {
        out.push_str(&format_loaded(file));
    }
    for skip in &dataset.skipped {
        out.push_str(&format_skip(skip));
    }

    out.push_str(&format!("\nColumns: {}\n", dataset.columns.join(", ")));

    out.push_str(&format!("\nCategories ({}):\n", report.categories.len()));
    out.push_str(&format!(
        "{:<16} {:<12} {:<16} {:<28} {:>6}  {}\n",
        "country", "technology", "zone", "kpi", "rows", "span"
    ));
    for c in &report.categories {
        let k = &c.category;
        out.push_str(&format!(
            "{:<16} {:<12} {:<16} {:<28} {:>6}  {} .. {}\n",
            truncate(&k.country, 16),
            truncate(&k.technology, 12),
            truncate(&k.zone, 16),
            truncate(&k.kpi, 28),
            c.rows,
            c.first,
            c.last
        ));
    }

    out
}

fn format_loaded(file: &LoadedFile) -> String {
    format!("  ok    {} -> {} ({} rows)\n", file.file, file.date, file.rows)
}

fn format_skip(skip: &SkippedFile) -> String {
    format!("  skip  {}: {}\n", skip.file, skip.reason)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::SkipReason;

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("North", 16), "North");
        assert_eq!(truncate("Call Completion Rate", 8), "Call Co.");
    }

    #[test]
    fn file_lines() {
        let loaded = LoadedFile {
            file: "Jan2023.xlsx".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            rows: 12,
        };
        let skipped = SkippedFile {
            file: "summary.xlsx".to_string(),
            reason: SkipReason::NoDate,
        };
        assert_eq!(format_loaded(&loaded), "  ok    Jan2023.xlsx -> 2023-01-01 (12 rows)\n");
        assert_eq!(
            format_skip(&skipped),
            "  skip  summary.xlsx: no month/year token in file name\n"
        );
    }
}
