//! CSV ingestion for activity exports.
//!
//! Reads the `Date, WrittenAt, Host, User, Application,
//! Total_Active_Time_Minutes` export and converts every row into an
//! [`ActivityRecord`].  Rows whose primary date cannot be parsed are dropped;
//! everything else is passed through as leniently as possible.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::ActivityRecord;
use dashboard_core::time_utils::{parse_date_day_first, parse_timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Header names every export must carry (order does not matter).
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Date",
    "WrittenAt",
    "Host",
    "User",
    "Application",
    "Total_Active_Time_Minutes",
];

// ── Public types ──────────────────────────────────────────────────────────────

/// Counters describing what happened to the rows of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Data rows seen (header excluded).
    pub rows_read: usize,
    /// Rows kept as [`ActivityRecord`]s.
    pub rows_retained: usize,
    /// Rows dropped because `Date` did not parse.
    pub dropped_invalid_date: usize,
    /// Rows the CSV decoder could not read at all.
    pub malformed_rows: usize,
    /// Retained rows whose `WrittenAt` is null.
    pub missing_written_at: usize,
    /// Retained rows whose duration cell was blank or not numeric.
    pub unparsed_minutes: usize,
}

/// Records ingested from one file plus the ingest counters.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub records: Vec<ActivityRecord>,
    pub report: IngestReport,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read and normalise an activity CSV from disk.
pub fn read_activity_csv(path: &Path) -> Result<Ingested> {
    let file = File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let ingested = parse_activity_csv(file)?;

    info!(
        "Loaded {} of {} rows from {} ({} dropped for invalid dates)",
        ingested.report.rows_retained,
        ingested.report.rows_read,
        path.display(),
        ingested.report.dropped_invalid_date,
    );

    Ok(ingested)
}

/// Parse an activity CSV from any reader.
///
/// Fails only when the header is unreadable or lacks a required column.
/// Individual bad rows never fail the whole file.
pub fn parse_activity_csv<R: Read>(input: R) -> Result<Ingested> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(input);

    let headers = normalise_headers(reader.headers()?);
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::MissingColumns(missing));
    }
    reader.set_headers(headers.clone());

    let mut ingested = Ingested::default();

    for (index, row) in reader.deserialize::<RawActivityRow>().enumerate() {
        ingested.report.rows_read += 1;
        // Line 1 is the header.
        let line = index + 2;

        let raw = match row {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping unreadable CSV row at line {}: {}", line, e);
                ingested.report.malformed_rows += 1;
                continue;
            }
        };

        match normalise_row(raw, &mut ingested.report) {
            Some(record) => ingested.records.push(record),
            None => {
                debug!("Dropping row at line {}: unparseable Date", line);
                ingested.report.dropped_invalid_date += 1;
            }
        }
    }

    ingested.report.rows_retained = ingested.records.len();
    Ok(ingested)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// One CSV row as text, before any coercion.
#[derive(Debug, Deserialize)]
struct RawActivityRow {
    #[serde(rename = "Date", default)]
    date: String,
    #[serde(rename = "WrittenAt", default)]
    written_at: String,
    #[serde(rename = "Host", default)]
    host: String,
    #[serde(rename = "User", default)]
    user: String,
    #[serde(rename = "Application", default)]
    application: String,
    #[serde(rename = "Total_Active_Time_Minutes", default)]
    total_active_time_minutes: String,
}

/// Strip a UTF-8 byte-order mark from the first header, if present.
fn normalise_headers(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').trim()
            } else {
                h.trim()
            }
        })
        .collect()
}

/// Coerce a raw row.  Returns `None` when the primary date does not parse.
fn normalise_row(raw: RawActivityRow, report: &mut IngestReport) -> Option<ActivityRecord> {
    let date = parse_date_day_first(&raw.date)?;

    let written_at = parse_timestamp(&raw.written_at);
    if written_at.is_none() {
        report.missing_written_at += 1;
    }

    let total_active_time_minutes = parse_minutes(&raw.total_active_time_minutes);
    if total_active_time_minutes.is_none() {
        report.unparsed_minutes += 1;
    }

    Some(ActivityRecord {
        date,
        written_at,
        host: raw.host,
        user: raw.user,
        application: raw.application,
        total_active_time_minutes,
    })
}

fn parse_minutes(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "Date,WrittenAt,Host,User,Application,Total_Active_Time_Minutes";

    fn parse(body: &str) -> Ingested {
        let text = format!("{}\n{}", HEADER, body);
        parse_activity_csv(text.as_bytes()).expect("valid csv")
    }

    #[test]
    fn test_parse_basic_rows() {
        let ingested = parse(
            "03/04/2024,2024-04-03 09:15:00,ws-1,alice,Excel,30\n\
             04/04/2024,2024-04-04 10:00:00,ws-2,bob,Word,12.5\n",
        );
        assert_eq!(ingested.records.len(), 2);
        let first = &ingested.records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 4, 3).unwrap());
        assert_eq!(first.written_at.unwrap().hour(), 9);
        assert_eq!(first.host, "ws-1");
        assert_eq!(first.user, "alice");
        assert_eq!(first.application, "Excel");
        assert_eq!(first.total_active_time_minutes, Some(30.0));
        assert_eq!(ingested.records[1].total_active_time_minutes, Some(12.5));
        assert_eq!(ingested.report.rows_read, 2);
        assert_eq!(ingested.report.rows_retained, 2);
    }

    #[test]
    fn test_invalid_primary_date_drops_row() {
        let ingested = parse(
            "not-a-date,2024-04-03 09:15:00,ws-1,alice,Excel,30\n\
             ,2024-04-03 09:15:00,ws-1,alice,Excel,30\n\
             05/04/2024,2024-04-05 09:15:00,ws-1,carol,Excel,30\n",
        );
        assert_eq!(ingested.records.len(), 1);
        assert_eq!(ingested.records[0].user, "carol");
        assert_eq!(ingested.report.dropped_invalid_date, 2);
        assert_eq!(ingested.report.rows_read, 3);
    }

    #[test]
    fn test_invalid_written_at_keeps_row() {
        let ingested = parse("03/04/2024,garbage,ws-1,alice,Excel,30\n");
        assert_eq!(ingested.records.len(), 1);
        assert!(ingested.records[0].written_at.is_none());
        assert_eq!(ingested.report.missing_written_at, 1);
    }

    #[test]
    fn test_permissive_minutes_and_identifiers() {
        let ingested = parse(
            "03/04/2024,2024-04-03 09:00:00,,,,abc\n\
             03/04/2024,2024-04-03 09:00:00,ws-1,alice,Excel,\n",
        );
        assert_eq!(ingested.records.len(), 2);
        assert_eq!(ingested.records[0].host, "");
        assert_eq!(ingested.records[0].user, "");
        assert_eq!(ingested.records[0].total_active_time_minutes, None);
        assert_eq!(ingested.records[1].total_active_time_minutes, None);
        assert_eq!(ingested.report.unparsed_minutes, 2);
    }

    #[test]
    fn test_columns_in_any_order_with_extras() {
        let text = "User,Extra,Application,Host,Total_Active_Time_Minutes,WrittenAt,Date\n\
                    alice,zzz,Excel,ws-1,7,2024-04-03 09:00:00,03/04/2024\n";
        let ingested = parse_activity_csv(text.as_bytes()).unwrap();
        assert_eq!(ingested.records.len(), 1);
        assert_eq!(ingested.records[0].user, "alice");
        assert_eq!(ingested.records[0].total_active_time_minutes, Some(7.0));
    }

    #[test]
    fn test_quoted_fields() {
        let ingested = parse("03/04/2024,2024-04-03 09:00:00,ws-1,\"Doe, Jane\",\"Visual Studio, Code\",5\n");
        assert_eq!(ingested.records[0].user, "Doe, Jane");
        assert_eq!(ingested.records[0].application, "Visual Studio, Code");
    }

    #[test]
    fn test_header_with_bom_and_spaces() {
        let text = "\u{feff}Date, WrittenAt ,Host,User,Application,Total_Active_Time_Minutes\n\
                    03/04/2024,2024-04-03 09:00:00,ws-1,alice,Excel,5\n";
        let ingested = parse_activity_csv(text.as_bytes()).unwrap();
        assert_eq!(ingested.records.len(), 1);
        assert!(ingested.records[0].written_at.is_some());
    }

    #[test]
    fn test_short_row_uses_defaults() {
        let ingested = parse("03/04/2024,2024-04-03 09:00:00,ws-1\n");
        assert_eq!(ingested.records.len(), 1);
        assert_eq!(ingested.records[0].user, "");
        assert_eq!(ingested.records[0].total_active_time_minutes, None);
    }

    #[test]
    fn test_missing_columns_is_error() {
        let text = "Date,Host,User\n03/04/2024,ws-1,alice\n";
        let err = parse_activity_csv(text.as_bytes()).unwrap_err();
        match err {
            DashboardError::MissingColumns(cols) => {
                assert_eq!(
                    cols,
                    vec![
                        "WrittenAt".to_string(),
                        "Application".to_string(),
                        "Total_Active_Time_Minutes".to_string()
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let ingested = parse_activity_csv(HEADER.as_bytes()).unwrap();
        assert!(ingested.records.is_empty());
        assert_eq!(ingested.report, IngestReport::default());
    }

    #[test]
    fn test_read_activity_csv_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("usage.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "03/04/2024,2024-04-03 09:15:00,ws-1,alice,Excel,30").unwrap();
        drop(file);

        let ingested = read_activity_csv(&path).unwrap();
        assert_eq!(ingested.records.len(), 1);
    }

    #[test]
    fn test_read_activity_csv_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_activity_csv(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::FileRead { .. }));
    }
}
