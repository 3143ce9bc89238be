// iislens - core/aggregate.rs
//
// Multi-file aggregation: concatenates per-file record sets in the order
// the files were presented, surfaces per-file parse failures without
// aborting the batch, and classifies the overall outcome.
// Core layer: pure logic over already-parsed results.

use crate::core::model::{BatchStatus, FileSummary, LogRecord};
use crate::util::error::{IisLensError, ParseError};

/// The outcome of parsing one file of a batch, paired with its label.
#[derive(Debug)]
pub struct FileParse {
    /// Display label, usually the file name.
    pub label: String,

    /// Parsed records, or the error that rejected the file.
    pub outcome: Result<Vec<LogRecord>, ParseError>,
}

impl FileParse {
    pub fn new(label: impl Into<String>, outcome: Result<Vec<LogRecord>, ParseError>) -> Self {
        Self {
            label: label.into(),
            outcome,
        }
    }
}

/// A parse failure attributed to one file of a batch.
#[derive(Debug, Clone)]
pub struct PerFileError {
    pub label: String,
    pub error: ParseError,
}

impl From<PerFileError> for IisLensError {
    fn from(e: PerFileError) -> Self {
        Self::PerFileParse {
            label: e.label,
            source: e.error,
        }
    }
}

/// Merged result of a multi-file batch.
#[derive(Debug, Clone, Default)]
pub struct AggregateResult {
    /// All successfully parsed records, concatenated in file presentation
    /// order. Never reordered, never deduplicated.
    pub records: Vec<LogRecord>,

    /// Files that failed to parse, in presentation order. Empty-input files
    /// (`NoDataLines`) are not failures and do not appear here.
    pub per_file_errors: Vec<PerFileError>,

    /// Per-file statistics for every file that contributed records or
    /// parsed to empty.
    pub file_summaries: Vec<FileSummary>,
}

impl AggregateResult {
    /// Classify the batch into one of the three user-visible outcomes.
    pub fn status(&self) -> BatchStatus {
        if !self.per_file_errors.is_empty() {
            BatchStatus::HadErrors
        } else if self.records.is_empty() {
            BatchStatus::Empty
        } else {
            BatchStatus::Records
        }
    }

    /// True when at least one file failed to parse.
    pub fn has_errors(&self) -> bool {
        !self.per_file_errors.is_empty()
    }
}

/// Concatenate per-file parse outcomes into one record sequence.
///
/// Order follows the input: file A's records precede file B's, and a
/// failing file in the middle does not disturb its neighbours. Failed files
/// contribute zero records and one `PerFileError` entry — except empty
/// inputs (`NoDataLines`), which contribute zero records and no error,
/// distinguishing "nothing to parse" from "failed to parse".
pub fn aggregate(file_results: Vec<FileParse>) -> AggregateResult {
    let mut result = AggregateResult::default();

    for FileParse { label, outcome } in file_results {
        match outcome {
            Ok(records) => {
                result.file_summaries.push(summarise(&label, &records));
                tracing::debug!(label = %label, records = records.len(), "File aggregated");
                result.records.extend(records);
            }
            Err(error) if error.is_empty_input() => {
                tracing::debug!(label = %label, "File was empty, no records contributed");
                result.file_summaries.push(FileSummary {
                    label,
                    record_count: 0,
                    earliest: None,
                    latest: None,
                });
            }
            Err(error) => {
                tracing::warn!(label = %label, error = %error, "File failed to parse");
                result.per_file_errors.push(PerFileError { label, error });
            }
        }
    }

    tracing::debug!(
        records = result.records.len(),
        failed_files = result.per_file_errors.len(),
        status = result.status().label(),
        "Aggregation complete"
    );

    result
}

/// Best-effort per-file statistics. Records whose datetime does not parse
/// are counted but excluded from the earliest/latest range.
fn summarise(label: &str, records: &[LogRecord]) -> FileSummary {
    let mut earliest = None;
    let mut latest = None;
    for dt in records.iter().filter_map(LogRecord::parsed_datetime) {
        if earliest.map_or(true, |e| dt < e) {
            earliest = Some(dt);
        }
        if latest.map_or(true, |l| dt > l) {
            latest = Some(dt);
        }
    }
    FileSummary {
        label: label.to_string(),
        record_count: records.len(),
        earliest,
        latest,
    }
}
