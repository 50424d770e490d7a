//! CSV ingest and cleaning.
//!
//! This module turns a two-column `date,rate` CSV into a clean, chronologically
//! ordered set of `Observation`s that are safe to aggregate.
//!
//! Design goals:
//! - **Fatal only when the source is unreadable** (clear error + exit code 2)
//! - **Row-level coercion** (drop bad rows, but report what happened)
//! - **Deterministic behavior** (same bytes in, same observations out)
//! - **Separation of concerns**: no metrics logic here

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{DateOrder, Observation};
use crate::error::AppError;

/// Why a single row was excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RowRejection {
    /// The date field did not parse as a calendar date.
    InvalidDate(String),
    /// The rate field was missing, non-numeric, or not finite.
    InvalidRate(String),
    /// The CSV reader could not decode the record at all.
    Malformed(String),
}

impl std::fmt::Display for RowRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowRejection::InvalidDate(raw) => write!(f, "invalid date '{raw}'"),
            RowRejection::InvalidRate(raw) => write!(f, "invalid rate '{raw}'"),
            RowRejection::Malformed(msg) => write!(f, "malformed record: {msg}"),
        }
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub line: usize,
    pub reason: RowRejection,
}

/// What the cleaning stage did to the raw rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    /// Data rows seen (the header, if any, is not counted).
    pub rows_read: usize,
    pub rows_used: usize,
    pub header_skipped: bool,
    pub invalid_dates: usize,
    pub invalid_rates: usize,
    pub malformed_records: usize,
    /// Rows identical (date and rate) to an earlier row.
    pub duplicates_removed: usize,
    /// Rows whose date was already taken by an earlier row with a different rate.
    pub conflicting_dates: usize,
    pub row_errors: Vec<RowError>,
}

impl CleaningReport {
    /// Rows excluded because a field failed coercion.
    pub fn rows_rejected(&self) -> usize {
        self.invalid_dates + self.invalid_rates + self.malformed_records
    }

    /// Every row that did not become an observation.
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_used
    }
}

/// Ingest output: cleaned observations + the cleaning report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestedData {
    pub observations: Vec<Observation>,
    pub report: CleaningReport,
}

/// One raw, still-textual data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: usize,
    pub date: String,
    pub rate: String,
}

/// Read the whole source file.
///
/// This is the only fatal failure of the loader: nothing is computed when the
/// file cannot be read.
pub fn read_source(path: &Path) -> Result<Vec<u8>, AppError> {
    let bytes = std::fs::read(path).map_err(|e| AppError::source_unavailable(path, e))?;
    info!(path = %path.display(), bytes = bytes.len(), "read source file");
    Ok(bytes)
}

/// Load and clean a CSV file into observations.
pub fn load_observations(path: &Path, date_order: DateOrder) -> Result<IngestedData, AppError> {
    let bytes = read_source(path)?;
    Ok(clean_csv(&bytes, date_order))
}

/// Clean CSV bytes. Never fails: undecodable records are counted as malformed.
pub fn clean_csv(bytes: &[u8], date_order: DateOrder) -> IngestedData {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    let mut malformed = Vec::new();
    let mut header_skipped = false;
    let mut first = true;

    for (idx, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(idx + 1);
                malformed.push(RowError {
                    line,
                    reason: RowRejection::Malformed(e.to_string()),
                });
                first = false;
                continue;
            }
        };

        if std::mem::take(&mut first) && is_header(&record, date_order) {
            header_skipped = true;
            continue;
        }

        let line = record.position().map(|p| p.line() as usize).unwrap_or(idx + 1);
        rows.push(RawRow {
            line,
            date: record.get(0).unwrap_or("").to_string(),
            rate: record.get(1).unwrap_or("").to_string(),
        });
    }

    let mut data = clean_rows(rows, date_order);
    let report = &mut data.report;
    report.header_skipped = header_skipped;
    report.rows_read += malformed.len();
    report.malformed_records = malformed.len();
    if !malformed.is_empty() {
        report.row_errors.extend(malformed);
        report.row_errors.sort_by_key(|e| e.line);
    }

    log_report(report);
    data
}

/// The filtering stage: coerce, drop invalid rows, dedupe, and sort.
pub fn clean_rows<I>(rows: I, date_order: DateOrder) -> IngestedData
where
    I: IntoIterator<Item = RawRow>,
{
    let mut report = CleaningReport::default();
    let mut accepted = Vec::new();

    for row in rows {
        report.rows_read += 1;
        let Some(date) = parse_date(&row.date, date_order) else {
            report.invalid_dates += 1;
            report.row_errors.push(RowError {
                line: row.line,
                reason: RowRejection::InvalidDate(row.date),
            });
            continue;
        };
        let Some(rate) = parse_rate(&row.rate) else {
            report.invalid_rates += 1;
            report.row_errors.push(RowError {
                line: row.line,
                reason: RowRejection::InvalidRate(row.rate),
            });
            continue;
        };
        accepted.push(Observation::new(date, rate));
    }

    // Exact duplicates first, keeping the first occurrence in file order.
    // `+ 0.0` folds -0.0 into 0.0 so both spellings compare equal.
    let mut seen: HashSet<(NaiveDate, u64)> = HashSet::with_capacity(accepted.len());
    let before = accepted.len();
    accepted.retain(|o| seen.insert((o.date, (o.rate + 0.0).to_bits())));
    report.duplicates_removed = before - accepted.len();

    // Stable: rows sharing a date stay in file order.
    accepted.sort_by_key(|o| o.date);

    let before = accepted.len();
    accepted.dedup_by_key(|o| o.date);
    report.conflicting_dates = before - accepted.len();

    report.rows_used = accepted.len();

    IngestedData {
        observations: accepted,
        report,
    }
}

/// The first record is a header only when both fields read as column labels
/// (`DATE,T10YIE`). A bad first data row such as `n/a,.` is kept so it is
/// counted as rejected.
fn is_header(record: &StringRecord, date_order: DateOrder) -> bool {
    let (Some(date), Some(rate)) = (record.get(0), record.get(1)) else {
        return false;
    };
    parse_date(date, date_order).is_none() && is_label(date) && is_label(rate)
}

fn is_label(field: &str) -> bool {
    let s = field.trim().trim_start_matches('\u{feff}');
    s.starts_with(|c: char| c.is_alphabetic())
        && s.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | ' ' | '-'))
        && s.parse::<f64>().is_err()
}

fn log_report(report: &CleaningReport) {
    for e in &report.row_errors {
        debug!(line = e.line, reason = %e.reason, "row rejected");
    }
    if report.rows_dropped() > 0 {
        warn!(
            rejected = report.rows_rejected(),
            duplicates = report.duplicates_removed,
            conflicting_dates = report.conflicting_dates,
            "dropped {} of {} rows during cleaning",
            report.rows_dropped(),
            report.rows_read,
        );
    }
    info!(
        rows_read = report.rows_read,
        rows_used = report.rows_used,
        "cleaned observations"
    );
}

const ISO_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const ISO_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DAY_FIRST_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const MONTH_FIRST_FORMATS: [&str; 2] = ["%m/%d/%Y", "%m-%d-%Y"];

/// Parse a date written in any of the accepted formats.
///
/// ISO dates and date-times always win. Numeric day/month dates are read in the
/// preferred order first, then in the other order (so `12/31/2021` still parses
/// as day-first input).
pub fn parse_date(raw: &str, date_order: DateOrder) -> Option<NaiveDate> {
    let s = raw.trim().trim_start_matches('\u{feff}');
    if s.is_empty() {
        return None;
    }

    for fmt in ISO_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in ISO_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    let (preferred, fallback): (&[&str], &[&str]) = match date_order {
        DateOrder::DayFirst => (&DAY_FIRST_FORMATS, &MONTH_FIRST_FORMATS),
        DateOrder::MonthFirst => (&MONTH_FIRST_FORMATS, &DAY_FIRST_FORMATS),
    };
    preferred
        .iter()
        .chain(fallback)
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a rate field. `.` is FRED's missing-value marker.
pub fn parse_rate(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(line: usize, date: &str, rate: &str) -> RawRow {
        RawRow {
            line,
            date: date.to_string(),
            rate: rate.to_string(),
        }
    }

    #[test]
    fn drops_duplicates_and_missing_rates() {
        let rows = vec![
            row(2, "2021-01-01", "1.5"),
            row(3, "2021-01-01", "1.5"),
            row(4, "2021-01-02", "NaN"),
            row(5, "2021-01-03", "1.7"),
        ];
        let data = clean_rows(rows, DateOrder::DayFirst);
        assert_eq!(
            data.observations,
            vec![
                Observation::new(d(2021, 1, 1), 1.5),
                Observation::new(d(2021, 1, 3), 1.7),
            ]
        );
        assert_eq!(data.report.rows_read, 4);
        assert_eq!(data.report.duplicates_removed, 1);
        assert_eq!(data.report.invalid_rates, 1);
        assert_eq!(data.report.row_errors[0].line, 4);
    }

    #[test]
    fn sorts_ascending_and_keeps_first_rate_for_a_date() {
        let rows = vec![
            row(2, "2021-03-01", "2.0"),
            row(3, "2021-01-01", "1.0"),
            row(4, "2021-03-01", "9.0"),
        ];
        let data = clean_rows(rows, DateOrder::DayFirst);
        assert_eq!(
            data.observations,
            vec![
                Observation::new(d(2021, 1, 1), 1.0),
                Observation::new(d(2021, 3, 1), 2.0),
            ]
        );
        assert_eq!(data.report.conflicting_dates, 1);
        assert_eq!(data.report.rows_dropped(), 1);
    }

    #[test]
    fn bad_rows_do_not_disturb_good_rows() {
        let good = vec![row(2, "2021-01-01", "1.1"), row(4, "2021-01-03", "1.3")];
        let mut with_bad = good.clone();
        with_bad.insert(1, row(3, "not a date", "1.2"));
        with_bad.push(row(5, "2021-01-04", "."));

        let clean = clean_rows(good, DateOrder::DayFirst);
        let dirty = clean_rows(with_bad, DateOrder::DayFirst);
        assert_eq!(clean.observations, dirty.observations);
        assert_eq!(dirty.report.invalid_dates, 1);
        assert_eq!(dirty.report.invalid_rates, 1);
        assert_eq!(dirty.report.rows_rejected(), 2);
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(parse_date("2021-02-03", DateOrder::DayFirst), Some(d(2021, 2, 3)));
        assert_eq!(parse_date("2021/02/03", DateOrder::MonthFirst), Some(d(2021, 2, 3)));
        assert_eq!(parse_date("20210203", DateOrder::DayFirst), Some(d(2021, 2, 3)));
        assert_eq!(parse_date("20210203", DateOrder::MonthFirst), Some(d(2021, 2, 3)));
        assert_eq!(parse_date("03/02/2021", DateOrder::DayFirst), Some(d(2021, 2, 3)));
        assert_eq!(parse_date("03/02/2021", DateOrder::MonthFirst), Some(d(2021, 3, 2)));
        assert_eq!(parse_date("31/12/2021", DateOrder::MonthFirst), Some(d(2021, 12, 31)));
        assert_eq!(parse_date("12/31/2021", DateOrder::DayFirst), Some(d(2021, 12, 31)));
        assert_eq!(parse_date("2021-02-03 00:00:00", DateOrder::DayFirst), Some(d(2021, 2, 3)));
        assert_eq!(parse_date("2021-02-03T10:00:00Z", DateOrder::DayFirst), Some(d(2021, 2, 3)));
        assert_eq!(parse_date("\u{feff}2021-02-03", DateOrder::DayFirst), Some(d(2021, 2, 3)));
        assert_eq!(parse_date("2021-02-30", DateOrder::DayFirst), None);
        assert_eq!(parse_date("DATE", DateOrder::DayFirst), None);
        assert_eq!(parse_date("", DateOrder::DayFirst), None);
    }

    #[test]
    fn parse_rate_rejects_placeholders() {
        assert_eq!(parse_rate(" 2.35 "), Some(2.35));
        assert_eq!(parse_rate("-0.5"), Some(-0.5));
        assert_eq!(parse_rate("."), None);
        assert_eq!(parse_rate(""), None);
        assert_eq!(parse_rate("n/a"), None);
        assert_eq!(parse_rate("NaN"), None);
        assert_eq!(parse_rate("inf"), None);
    }

    #[test]
    fn csv_header_is_detected_and_skipped() {
        let csv = b"observation_date,T10YIE\n2021-01-04,2.00\n2021-01-05,.\n";
        let data = clean_csv(csv, DateOrder::DayFirst);
        assert!(data.report.header_skipped);
        assert_eq!(data.report.rows_read, 2);
        assert_eq!(data.observations, vec![Observation::new(d(2021, 1, 4), 2.0)]);
        assert_eq!(data.report.row_errors[0].line, 3);
    }

    #[test]
    fn compact_iso_dates_are_accepted() {
        let data = clean_csv(b"DATE,T10YIE\n20210104,2.0\n20210105,2.1\n", DateOrder::DayFirst);
        assert!(data.report.header_skipped);
        assert_eq!(data.report.invalid_dates, 0);
        assert_eq!(data.observations.len(), 2);
        assert_eq!(data.observations[0].date, d(2021, 1, 4));
    }

    #[test]
    fn bad_first_row_without_header_is_counted_as_rejected() {
        let data = clean_csv(b"n/a,.\n2021-01-04,2.0\n", DateOrder::DayFirst);
        assert!(!data.report.header_skipped);
        assert_eq!(data.report.rows_read, 2);
        assert_eq!(data.report.rows_rejected(), 1);
        assert_eq!(data.report.invalid_dates, 1);
        assert_eq!(data.report.row_errors[0].line, 1);
        assert_eq!(data.observations, vec![Observation::new(d(2021, 1, 4), 2.0)]);
    }

    #[test]
    fn numeric_placeholder_first_row_is_not_a_header() {
        let data = clean_csv(b"NaN,NaN\n2021-01-04,2.0\n", DateOrder::DayFirst);
        assert!(!data.report.header_skipped);
        assert_eq!(data.report.rows_rejected(), 1);
    }

    #[test]
    fn csv_without_header_keeps_first_row() {
        let csv = b"2021-01-04,2.00\n2021-01-05,2.10\n";
        let data = clean_csv(csv, DateOrder::DayFirst);
        assert!(!data.report.header_skipped);
        assert_eq!(data.observations.len(), 2);
    }

    #[test]
    fn header_only_csv_is_empty_not_an_error() {
        let data = clean_csv(b"DATE,T10YIE\n", DateOrder::DayFirst);
        assert!(data.observations.is_empty());
        assert_eq!(data.report.rows_read, 0);
        assert_eq!(data.report.rows_dropped(), 0);
    }

    #[test]
    fn short_records_count_as_invalid_rates() {
        let csv = b"Date,Rate\n2021-01-04\n2021-01-05,2.1,extra\n";
        let data = clean_csv(csv, DateOrder::DayFirst);
        assert_eq!(data.report.invalid_rates, 1);
        assert_eq!(data.observations, vec![Observation::new(d(2021, 1, 5), 2.1)]);
    }
}
