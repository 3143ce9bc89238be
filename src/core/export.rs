// iislens - core/export.rs
//
// CSV and JSON export of parsed records.
// Core layer: writes to any Write trait object; the caller owns file
// naming and format choice.

use crate::core::model::LogRecord;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export column headers, in the fixed downstream presentation order.
///
/// The names are the original W3C column names plus the two derived
/// columns (`Account`, `source-file`). Downstream formatting locates the
/// `time-taken` column by name, so this order is part of the contract.
pub const EXPORT_COLUMNS: &[&str] = &[
    "datetime",
    "s-computername",
    "cs-method",
    "cs-uri-stem",
    "cs(User-Agent)",
    "cs(Referer)",
    "cs-host",
    "sc-status",
    "time-taken",
    "_RequestID",
    "True-Client-IP",
    "_X-SessionID",
    "Account",
    "source-file",
];

/// Index of the `time-taken` column within `EXPORT_COLUMNS`.
///
/// Looked up by name so a column reorder cannot silently desynchronise the
/// formatting hook that keys off this column.
pub fn time_taken_column() -> usize {
    EXPORT_COLUMNS
        .iter()
        .position(|c| *c == crate::util::constants::FIELD_TIME_TAKEN)
        .expect("EXPORT_COLUMNS contains time-taken")
}

/// Export records to CSV, header row first.
///
/// Values are written verbatim, including `-` placeholders; a record with
/// no derived account gets an empty `Account` cell. Returns the number of
/// record rows written.
pub fn export_csv<W: Write>(
    records: &[LogRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(EXPORT_COLUMNS)
        .map_err(|e| ExportError::Csv {
            path: export_path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for rec in records {
        csv_writer
            .write_record([
                rec.datetime.as_str(),
                rec.server_name.as_str(),
                rec.method.as_str(),
                rec.uri_stem.as_str(),
                rec.user_agent.as_str(),
                rec.referer.as_str(),
                rec.host.as_str(),
                rec.status.as_str(),
                rec.time_taken.as_str(),
                rec.request_id.as_str(),
                rec.client_ip.as_str(),
                rec.session_id.as_str(),
                rec.account.as_deref().unwrap_or(""),
                rec.source_file.as_deref().unwrap_or(""),
            ])
            .map_err(|e| ExportError::Csv {
                path: export_path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(rows = count, path = %export_path.display(), "CSV export complete");
    Ok(count)
}

/// Export records to JSON (array of objects, record-model field names).
pub fn export_json<W: Write>(
    records: &[LogRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, records).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(rows = records.len(), path = %export_path.display(), "JSON export complete");
    Ok(records.len())
}
