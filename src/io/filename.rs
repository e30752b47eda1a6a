//! Month resolution from export file names.
//!
//! Monthly exports are named like `Jan2023.xlsx` or `KPI_Report_mar2024_v2.xls`.
//! The first `<letters×3><digits×4>` token in the stem decides the month; if
//! its letters are not a month abbreviation the file has no date.

use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z]{3})(\d{4})").expect("valid month/year regex"));

/// 1-based month number for a three-letter abbreviation (any case).
pub fn month_number(abbr: &str) -> Option<u32> {
    let lower = abbr.to_ascii_lowercase();
    MONTHS.iter().position(|m| *m == lower).map(|idx| idx as u32 + 1)
}

/// Resolve the first-of-month date encoded in a file name.
///
/// Accepts a bare file name or a full path; only the stem is inspected.
pub fn resolve_month(file_name: impl AsRef<Path>) -> Option<NaiveDate> {
    let stem = file_name.as_ref().file_stem()?.to_str()?;
    let caps = MONTH_YEAR_RE.captures(stem)?;
    let month = month_number(&caps[1])?;
    let year: i32 = caps[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Canonical `YYYY-MM-01` form.
pub fn resolve_month_string(file_name: impl AsRef<Path>) -> Option<String> {
    resolve_month(file_name).map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_plain_names() {
        assert_eq!(resolve_month_string("Jan2023.xlsx").as_deref(), Some("2023-01-01"));
        assert_eq!(resolve_month_string("Dec1999_v2.xls").as_deref(), Some("1999-12-01"));
    }

    #[test]
    fn every_month_maps_to_its_ordinal() {
        for (idx, abbr) in MONTHS.iter().enumerate() {
            let upper = abbr.to_ascii_uppercase();
            let name = format!("{upper}2021.xlsx");
            let expected = format!("2021-{:02}-01", idx + 1);
            assert_eq!(resolve_month_string(&name), Some(expected));
        }
    }

    #[test]
    fn token_may_appear_anywhere_in_stem() {
        assert_eq!(resolve_month_string("KPI_Report_mar2024_final.xlsx").as_deref(), Some("2024-03-01"));
        assert_eq!(resolve_month_string("exports/2024/Aug2024.xlsx").as_deref(), Some("2024-08-01"));
    }

    #[test]
    fn no_token_means_no_date() {
        assert_eq!(resolve_month("summary.xlsx"), None);
        assert_eq!(resolve_month("Jan23.xlsx"), None);
        assert_eq!(resolve_month(""), None);
    }

    #[test]
    fn only_first_token_counts() {
        // "Rev2023" is the first match and is not a month.
        assert_eq!(resolve_month("Rev2023_Jan2024.xlsx"), None);
        assert_eq!(resolve_month_string("Feb2022_Mar2023.xlsx").as_deref(), Some("2022-02-01"));
    }

    #[test]
    fn extension_is_not_part_of_the_stem() {
        assert_eq!(resolve_month("report.Jan2023"), None);
    }
}
