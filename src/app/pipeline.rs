// iislens - app/pipeline.rs
//
// One invocation of the parse-aggregate-filter pipeline: resolve the input
// paths (explicit files and/or discovered directory contents), decode each
// file, parse, aggregate, filter. Synchronous and single-threaded; the
// working set is owned exclusively by the invocation.
//
// Per-file read and parse errors are non-fatal: they are reported and the
// batch continues with the remaining files.

use crate::app::cache::{InputFingerprint, ResultCache};
use crate::core::aggregate::{self, AggregateResult, FileParse, PerFileError};
use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::filter::{filter_by_account, AccountAllowList};
use crate::core::model::{BatchStatus, FileSummary, LogFile, LogRecord};
use crate::core::parser;
use crate::platform::config::RawConfig;
use crate::util::constants;
use crate::util::error::{IisLensError, Result};
use std::path::PathBuf;

/// Outcome of one pipeline invocation.
#[derive(Debug)]
pub struct PipelineReport {
    /// Records surviving the account filter, in batch presentation order.
    pub records: Vec<LogRecord>,

    /// Record count before filtering.
    pub total_parsed: usize,

    /// Classification of the parse stage (independent of filtering).
    pub status: BatchStatus,

    /// Files that failed to parse.
    pub per_file_errors: Vec<PerFileError>,

    /// Per-file statistics for files that parsed.
    pub file_summaries: Vec<FileSummary>,

    /// Non-fatal discovery and read warnings.
    pub warnings: Vec<String>,
}

/// Build a `DiscoveryConfig` from loaded configuration, clamping limits to
/// the absolute bounds in `util::constants`.
pub fn discovery_config_from(config: &RawConfig) -> DiscoveryConfig {
    let defaults = DiscoveryConfig::default();
    DiscoveryConfig {
        max_depth: config
            .discovery
            .max_depth
            .unwrap_or(defaults.max_depth)
            .min(constants::ABSOLUTE_MAX_DEPTH),
        max_files: config
            .discovery
            .max_files
            .unwrap_or(defaults.max_files)
            .min(constants::ABSOLUTE_MAX_FILES),
        include_patterns: config
            .discovery
            .include_patterns
            .clone()
            .unwrap_or(defaults.include_patterns),
        exclude_patterns: config
            .discovery
            .exclude_patterns
            .clone()
            .unwrap_or(defaults.exclude_patterns),
    }
}

/// Expand the user-supplied paths into the concrete file list, in
/// presentation order: explicit files stay where they were given;
/// directories contribute their discovered log files in walk order.
///
/// Explicit files bypass the include-pattern filter — naming a file is a
/// stronger signal than its extension.
pub fn resolve_inputs(
    inputs: &[PathBuf],
    config: &DiscoveryConfig,
) -> Result<(Vec<PathBuf>, Vec<String>)> {
    let mut files = Vec::new();
    let mut warnings = Vec::new();

    for input in inputs {
        let meta = std::fs::metadata(input).map_err(|e| IisLensError::Io {
            path: input.clone(),
            operation: "stat",
            source: e,
        })?;

        if meta.is_dir() {
            let (discovered, mut dir_warnings) = discovery::discover_files(input, config)?;
            tracing::debug!(
                root = %input.display(),
                found = discovered.len(),
                "Directory expanded"
            );
            files.extend(discovered.into_iter().map(|f| f.path));
            warnings.append(&mut dir_warnings);
        } else {
            files.push(input.clone());
        }
    }

    Ok((files, warnings))
}

/// Read and decode the resolved files.
///
/// Decoding is best-effort: invalid UTF-8 sequences are replaced rather
/// than rejected, matching how operators actually receive IIS logs.
/// Unreadable files are skipped with a warning; the batch continues.
fn load_files(paths: &[PathBuf]) -> (Vec<LogFile>, Vec<String>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut warnings = Vec::new();

    for path in paths {
        match std::fs::read(path) {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes).into_owned();
                files.push(LogFile::new(path.display().to_string(), content));
            }
            Err(e) => {
                let msg = format!("Cannot read '{}': {e}", path.display());
                tracing::warn!(warning = %msg, "Skipping unreadable file");
                warnings.push(msg);
            }
        }
    }

    (files, warnings)
}

/// Parse a batch of already-loaded files and merge the results.
pub fn parse_batch(files: &[LogFile]) -> AggregateResult {
    let parsed = files
        .iter()
        .map(|f| FileParse::new(&f.name, parser::parse(&f.content, Some(&f.name))))
        .collect();
    aggregate::aggregate(parsed)
}

/// Run the full pipeline over the given input paths.
pub fn run(
    inputs: &[PathBuf],
    allow: &AccountAllowList,
    config: &DiscoveryConfig,
) -> Result<PipelineReport> {
    let (resolved, mut warnings) = resolve_inputs(inputs, config)?;
    let (files, read_warnings) = load_files(&resolved);
    warnings.extend(read_warnings);

    let result = parse_batch(&files);
    Ok(report_from(result, allow, warnings))
}

/// Run the pipeline with a shell-owned result cache.
///
/// When the resolved input set's fingerprint matches the cached one, the
/// parse stage is skipped entirely and the cached aggregate is re-filtered
/// — re-export with a different allow-list or format costs no re-parse.
/// Any change to the input set (new upload) misses and replaces the slot.
pub fn run_with_cache(
    inputs: &[PathBuf],
    allow: &AccountAllowList,
    config: &DiscoveryConfig,
    cache: &mut ResultCache,
) -> Result<PipelineReport> {
    let (resolved, mut warnings) = resolve_inputs(inputs, config)?;

    let fingerprint = match InputFingerprint::of(&resolved) {
        Ok(fp) => fp,
        Err(e) => {
            // No provable identity: fall back to an uncached run.
            tracing::debug!(error = %e, "Input fingerprint unavailable, bypassing cache");
            let (files, read_warnings) = load_files(&resolved);
            warnings.extend(read_warnings);
            return Ok(report_from(parse_batch(&files), allow, warnings));
        }
    };

    if let Some(cached) = cache.lookup(&fingerprint) {
        tracing::debug!("Cache hit, re-using parsed batch");
        return Ok(report_from(cached.clone(), allow, warnings));
    }

    let (files, read_warnings) = load_files(&resolved);
    warnings.extend(read_warnings);

    let result = parse_batch(&files);
    cache.store(fingerprint, result.clone());
    Ok(report_from(result, allow, warnings))
}

fn report_from(
    result: AggregateResult,
    allow: &AccountAllowList,
    warnings: Vec<String>,
) -> PipelineReport {
    let status = result.status();
    let total_parsed = result.records.len();
    let records = filter_by_account(&result.records, allow);

    tracing::info!(
        parsed = total_parsed,
        exported = records.len(),
        failed_files = result.per_file_errors.len(),
        status = status.label(),
        "Pipeline complete"
    );

    PipelineReport {
        records,
        total_parsed,
        status,
        per_file_errors: result.per_file_errors,
        file_summaries: result.file_summaries,
        warnings,
    }
}
