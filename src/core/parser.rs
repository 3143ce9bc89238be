// iislens - core/parser.rs
//
// IIS W3C log text parsing: locate the in-band column declaration, align
// data rows against it, project the required columns into LogRecords.
// Core layer: accepts already-decoded text, never touches the filesystem.
//
// Failure policy: any malformed row rejects the whole file. No partial
// record set is ever emitted alongside an error; the caller decides whether
// the failure is fatal or just skips this file when aggregating a batch.

use crate::core::model::LogRecord;
use crate::util::constants;
use crate::util::error::ParseError;
use regex::Regex;
use std::sync::OnceLock;

/// Validated positions of the required columns within a declared field list.
///
/// Built once per file after the required-column check, so row projection
/// indexes directly instead of repeating name lookups per line.
#[derive(Debug, Clone)]
struct FieldLayout {
    field_count: usize,
    date: usize,
    time: usize,
    server_name: usize,
    method: usize,
    uri_stem: usize,
    user_agent: usize,
    referer: usize,
    host: usize,
    status: usize,
    time_taken: usize,
    request_id: usize,
    client_ip: usize,
    session_id: usize,
}

impl FieldLayout {
    /// Resolve the required column positions from a declared field list.
    ///
    /// Returns `MissingRequiredColumns` naming every absent column at once,
    /// rather than failing on the first, so the operator sees the full
    /// repair list in one pass.
    fn resolve(fields: &[&str]) -> Result<Self, ParseError> {
        let mut missing: Vec<String> = Vec::new();
        let mut require = |name: &str| -> usize {
            match fields.iter().position(|f| *f == name) {
                Some(idx) => idx,
                None => {
                    missing.push(name.to_string());
                    usize::MAX // never read: the error return below wins
                }
            }
        };

        let layout = Self {
            field_count: fields.len(),
            date: require(constants::FIELD_DATE),
            time: require(constants::FIELD_TIME),
            server_name: require(constants::FIELD_SERVER_NAME),
            method: require(constants::FIELD_METHOD),
            uri_stem: require(constants::FIELD_URI_STEM),
            user_agent: require(constants::FIELD_USER_AGENT),
            referer: require(constants::FIELD_REFERER),
            host: require(constants::FIELD_HOST),
            status: require(constants::FIELD_STATUS),
            time_taken: require(constants::FIELD_TIME_TAKEN),
            request_id: require(constants::FIELD_REQUEST_ID),
            client_ip: require(constants::FIELD_CLIENT_IP),
            session_id: require(constants::FIELD_SESSION_ID),
        };

        if missing.is_empty() {
            Ok(layout)
        } else {
            Err(ParseError::MissingRequiredColumns { columns: missing })
        }
    }
}

/// Parse the full decoded text of one IIS log file into records.
///
/// `source_label` identifies the originating file; it is attached to every
/// record as `source_file` so multi-file aggregation stays traceable.
///
/// The format is self-describing: a header section of `#`-prefixed comment
/// lines, one of which (`#Fields:`) declares the whitespace-delimited column
/// names in order, followed by one record per line with single-space-
/// separated values. Only the first `#Fields:` line is honoured.
///
/// A file with a valid header but no data lines fails with `NoDataLines`;
/// callers aggregating a batch treat that as an empty contribution rather
/// than a failure (`ParseError::is_empty_input`).
pub fn parse(text: &str, source_label: Option<&str>) -> Result<Vec<LogRecord>, ParseError> {
    tracing::debug!(label = source_label.unwrap_or("<unlabelled>"), "Parsing started");

    // IIS logs are CRLF-terminated; str::lines leaves the trailing \r on,
    // which would corrupt the final column of every row.
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();

    // First #Fields: line wins; later duplicates are ignored.
    let fields: Vec<&str> = lines
        .iter()
        .find_map(|l| l.strip_prefix(constants::FIELDS_HEADER_PREFIX))
        .map(|rest| rest.split_whitespace().collect())
        .ok_or(ParseError::MissingFieldsHeader)?;

    // Data lines keep their 1-based position in the file for error reporting.
    let data_lines: Vec<(u64, &str)> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| !l.starts_with(constants::COMMENT_PREFIX) && !l.trim().is_empty())
        .map(|(idx, l)| ((idx as u64) + 1, *l))
        .collect();

    if data_lines.is_empty() {
        return Err(ParseError::NoDataLines);
    }

    // Align every row before binding columns: a shape mismatch anywhere in
    // the file rejects the batch for this file.
    let mut rows: Vec<(u64, Vec<&str>)> = Vec::with_capacity(data_lines.len());
    for (line_number, line) in data_lines {
        let tokens: Vec<&str> = line.split(' ').collect();
        if tokens.len() != fields.len() {
            return Err(ParseError::RowShapeMismatch {
                line_number,
                expected: fields.len(),
                found: tokens.len(),
            });
        }
        rows.push((line_number, tokens));
    }

    let layout = FieldLayout::resolve(&fields)?;
    debug_assert_eq!(layout.field_count, fields.len());

    let records: Vec<LogRecord> = rows
        .into_iter()
        .map(|(_, row)| project_row(&row, &layout, source_label))
        .collect();

    tracing::debug!(
        label = source_label.unwrap_or("<unlabelled>"),
        records = records.len(),
        "Parsing complete"
    );

    Ok(records)
}

/// Project one aligned row into a LogRecord.
///
/// Values are copied verbatim — the `-` placeholder is preserved unchanged.
fn project_row(row: &[&str], layout: &FieldLayout, source_label: Option<&str>) -> LogRecord {
    let request_id = row[layout.request_id].to_string();
    LogRecord {
        datetime: format!("{} {}", row[layout.date], row[layout.time]),
        server_name: row[layout.server_name].to_string(),
        method: row[layout.method].to_string(),
        uri_stem: row[layout.uri_stem].to_string(),
        user_agent: row[layout.user_agent].to_string(),
        referer: row[layout.referer].to_string(),
        host: row[layout.host].to_string(),
        status: row[layout.status].to_string(),
        time_taken: row[layout.time_taken].to_string(),
        account: extract_account(&request_id),
        request_id,
        client_ip: row[layout.client_ip].to_string(),
        session_id: row[layout.session_id].to_string(),
        source_file: source_label.map(String::from),
    }
}

// =============================================================================
// Account extraction
// =============================================================================

/// Extract the account suffix from a composite request id.
///
/// The contractual shape is `<something>@<account>`; the account is the
/// suffix after the *last* `@`. Total by construction: returns `None` when
/// no `@` is present or the suffix after the last `@` is empty — never an
/// empty string, never an error.
pub fn extract_account(request_id: &str) -> Option<String> {
    static ACCOUNT_RE: OnceLock<Regex> = OnceLock::new();
    let re = ACCOUNT_RE
        .get_or_init(|| Regex::new(r"@([^@]+)$").expect("account suffix regex is valid"));
    re.captures(request_id).map(|caps| caps[1].to_string())
}
