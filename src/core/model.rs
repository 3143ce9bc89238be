// iislens - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use chrono::NaiveDateTime;
use serde::Serialize;

// =============================================================================
// Log Record (normalised output of parsing)
// =============================================================================

/// One structured record, derived from exactly one IIS log line.
///
/// This is the core data unit that flows through aggregation, filtering,
/// and export. Field values are verbatim copies of the log's tokens — the
/// `-` placeholder the format uses for "absent" is preserved unchanged, and
/// any normalisation is left to the export boundary. Numeric views are
/// available through the typed accessors.
///
/// Serialises with the field names the record model exposes downstream
/// (`serverName`, `timeTaken`, ...); the CSV writer uses the original W3C
/// column names instead (see `core::export::EXPORT_COLUMNS`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// `date` and `time` columns joined with a single space, verbatim.
    /// No timezone normalisation is applied.
    pub datetime: String,

    /// Originating server/computer identifier (`s-computername`).
    pub server_name: String,

    /// HTTP method (`cs-method`).
    pub method: String,

    /// Requested path (`cs-uri-stem`).
    pub uri_stem: String,

    /// Client user agent (`cs(User-Agent)`), may be `-`.
    pub user_agent: String,

    /// Request referer (`cs(Referer)`), may be `-`.
    pub referer: String,

    /// Requested host (`cs-host`), may be `-`.
    pub host: String,

    /// HTTP status code (`sc-status`), numeric-as-string.
    pub status: String,

    /// Response time in milliseconds (`time-taken`), numeric-as-string.
    pub time_taken: String,

    /// Opaque request identifier (`_RequestID`) with the contractual shape
    /// `<something>@<account>`.
    pub request_id: String,

    /// Originating client IP (`True-Client-IP`).
    pub client_ip: String,

    /// Session token (`_X-SessionID`).
    pub session_id: String,

    /// Derived: suffix of `request_id` after its last `@`. `None` when the
    /// request id carries no usable account suffix; never an empty string.
    pub account: Option<String>,

    /// Label of the originating file, for traceability when multiple files
    /// are merged.
    pub source_file: Option<String>,
}

impl LogRecord {
    /// Numeric view of `status`. `None` for the `-` placeholder or any
    /// non-numeric value.
    pub fn status_code(&self) -> Option<u16> {
        self.status.parse().ok()
    }

    /// Numeric view of `time_taken` in milliseconds. `None` for the `-`
    /// placeholder or any non-numeric value. Downstream formatting keys off
    /// this column, so the numeric view lives on the record itself.
    pub fn time_taken_ms(&self) -> Option<i64> {
        self.time_taken.parse().ok()
    }

    /// Best-effort parse of the verbatim `datetime` string. Used for
    /// summary statistics only; the record keeps the verbatim form.
    pub fn parsed_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.datetime, constants::DATETIME_FORMAT).ok()
    }
}

// =============================================================================
// Log File (unit of parser input)
// =============================================================================

/// A named raw-text blob, the unit the parser consumes.
///
/// Produced by the shell (discovery + best-effort decoding), consumed once,
/// never persisted. `name` becomes the records' `source_file` label.
#[derive(Debug, Clone)]
pub struct LogFile {
    /// Display label, usually the file name.
    pub name: String,

    /// Full decoded text of the log file.
    pub content: String,
}

impl LogFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

// =============================================================================
// Batch status
// =============================================================================

/// Classification of a completed parse-aggregate batch.
///
/// Distinguishes the three user-visible outcomes: records were produced;
/// nothing parsed but nothing failed (empty input, a warning rather than a
/// crash); or one or more files failed to parse (surfaced per file without
/// discarding successfully parsed files).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// At least one record was produced.
    Records,

    /// Zero records and zero hard errors.
    Empty,

    /// At least one file produced a parse error.
    HadErrors,
}

impl BatchStatus {
    /// Human-readable label for operator-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Records => "records parsed",
            Self::Empty => "no records found",
            Self::HadErrors => "completed with per-file errors",
        }
    }
}

// =============================================================================
// Per-file summary
// =============================================================================

/// Per-file aggregation statistics, reported alongside the merged records.
#[derive(Debug, Clone)]
pub struct FileSummary {
    /// File label (matches the records' `source_file`).
    pub label: String,

    /// Number of records contributed by this file.
    pub record_count: usize,

    /// Earliest best-effort parsed datetime found (if any).
    pub earliest: Option<NaiveDateTime>,

    /// Latest best-effort parsed datetime found (if any).
    pub latest: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(status: &str, time_taken: &str, datetime: &str) -> LogRecord {
        LogRecord {
            datetime: datetime.to_string(),
            server_name: "SRV1".to_string(),
            method: "GET".to_string(),
            uri_stem: "/home".to_string(),
            user_agent: "-".to_string(),
            referer: "-".to_string(),
            host: "site.example".to_string(),
            status: status.to_string(),
            time_taken: time_taken.to_string(),
            request_id: "abc@user1".to_string(),
            client_ip: "10.0.0.1".to_string(),
            session_id: "sess1".to_string(),
            account: Some("user1".to_string()),
            source_file: None,
        }
    }

    #[test]
    fn test_status_code_numeric() {
        let rec = record_with("200", "15", "2024-01-01 00:00:01");
        assert_eq!(rec.status_code(), Some(200));
    }

    #[test]
    fn test_status_code_placeholder_is_none() {
        let rec = record_with("-", "15", "2024-01-01 00:00:01");
        assert_eq!(rec.status_code(), None);
    }

    #[test]
    fn test_time_taken_ms_numeric_and_placeholder() {
        assert_eq!(
            record_with("200", "1234", "2024-01-01 00:00:01").time_taken_ms(),
            Some(1234)
        );
        assert_eq!(
            record_with("200", "-", "2024-01-01 00:00:01").time_taken_ms(),
            None
        );
    }

    #[test]
    fn test_parsed_datetime_best_effort() {
        let rec = record_with("200", "15", "2024-01-01 00:00:01");
        let dt = rec.parsed_datetime().expect("should parse");
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-01-01 00:00:01");

        let bad = record_with("200", "15", "not-a-date");
        assert!(bad.parsed_datetime().is_none());
    }

    #[test]
    fn test_json_field_names_follow_record_model() {
        let rec = record_with("200", "15", "2024-01-01 00:00:01");
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"serverName\""));
        assert!(json.contains("\"timeTaken\""));
        assert!(json.contains("\"requestId\""));
        assert!(json.contains("\"sourceFile\""));
    }
}
