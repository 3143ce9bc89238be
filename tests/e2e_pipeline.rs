// iislens - tests/e2e_pipeline.rs
//
// End-to-end tests for the discovery, parsing, aggregation, filtering, and
// export pipeline.
//
// These tests exercise the real filesystem, real walkdir traversal, and
// the real parser over on-disk fixture files — no mocks, no stubs. This
// exercises the full path from a raw IIS log file on disk to structured
// LogRecords and an export byte stream.

use iislens::app::pipeline;
use iislens::core::aggregate::{aggregate, FileParse};
use iislens::core::discovery::{discover_files, DiscoveryConfig};
use iislens::core::export;
use iislens::core::filter::{filter_by_account, AccountAllowList};
use iislens::core::model::BatchStatus;
use iislens::core::parser;
use iislens::util::error::ParseError;
use std::fs;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture(name)).expect("read fixture")
}

// =============================================================================
// Discovery E2E
// =============================================================================

/// Discovering the fixtures directory should find all four .log files.
#[test]
fn e2e_discovers_fixture_log_files() {
    let (files, warnings) =
        discover_files(&fixtures_dir(), &DiscoveryConfig::default()).unwrap();

    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

    let names: Vec<_> = files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
        .collect();

    for expected in [
        "header_only.log",
        "iis_w3c_reordered.log",
        "iis_w3c_sample.log",
        "no_fields_header.log",
    ] {
        assert!(
            names.contains(&expected.to_string()),
            "expected {expected} in {names:?}"
        );
    }
}

// =============================================================================
// Parsing E2E
// =============================================================================

/// End-to-end parse of iis_w3c_sample.log: record count, datetime
/// concatenation, verbatim placeholders, derived accounts.
#[test]
fn e2e_parse_sample_fixture() {
    let content = read_fixture("iis_w3c_sample.log");
    let records = parser::parse(&content, Some("iis_w3c_sample.log")).unwrap();

    assert_eq!(records.len(), 5);

    let first = &records[0];
    assert_eq!(first.datetime, "2024-03-05 08:15:01");
    assert_eq!(first.server_name, "WEB01");
    assert_eq!(first.uri_stem, "/index.html");
    assert_eq!(first.referer, "-", "placeholder passes through verbatim");
    assert_eq!(first.account.as_deref(), Some("acme"));
    assert_eq!(first.source_file.as_deref(), Some("iis_w3c_sample.log"));

    // The health probe line has no @ in its request id: account is None,
    // and the `-` session id survives untouched.
    let probe = &records[3];
    assert_eq!(probe.request_id, "probe-internal");
    assert_eq!(probe.account, None);
    assert_eq!(probe.session_id, "-");

    // Numeric accessors give the formatting layer its typed view.
    let slow = &records[4];
    assert_eq!(slow.status_code(), Some(500));
    assert_eq!(slow.time_taken_ms(), Some(1843));
}

/// The reordered fixture declares the same columns in a different order;
/// name-based binding must produce identical field semantics.
#[test]
fn e2e_parse_reordered_fixture() {
    let content = read_fixture("iis_w3c_reordered.log");
    let records = parser::parse(&content, Some("iis_w3c_reordered.log")).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].datetime, "2024-03-06 02:00:10");
    assert_eq!(records[0].method, "GET");
    assert_eq!(records[0].uri_stem, "/login");
    assert_eq!(records[0].account.as_deref(), Some("initech"));
    assert_eq!(records[1].method, "DELETE");
    assert_eq!(records[1].status, "204");
}

#[test]
fn e2e_parse_headerless_fixture_fails() {
    let content = read_fixture("no_fields_header.log");
    let err = parser::parse(&content, None).unwrap_err();
    assert_eq!(err, ParseError::MissingFieldsHeader);
}

/// A file with a valid header and zero data lines yields zero records and
/// no error entry at the aggregation boundary.
#[test]
fn e2e_header_only_fixture_is_empty_not_failed() {
    let content = read_fixture("header_only.log");
    let result = aggregate(vec![FileParse::new(
        "header_only.log",
        parser::parse(&content, Some("header_only.log")),
    )]);

    assert!(result.records.is_empty());
    assert!(result.per_file_errors.is_empty());
    assert_eq!(result.status(), BatchStatus::Empty);
}

// =============================================================================
// Aggregation + filtering E2E
// =============================================================================

/// Two files, allow-list for one account: aggregate-then-filter keeps
/// exactly that account's records, in file presentation order.
#[test]
fn e2e_aggregate_and_filter_across_files() {
    let sample = read_fixture("iis_w3c_sample.log");
    let reordered = read_fixture("iis_w3c_reordered.log");

    let result = aggregate(vec![
        FileParse::new("a.log", parser::parse(&sample, Some("a.log"))),
        FileParse::new("b.log", parser::parse(&reordered, Some("b.log"))),
    ]);
    assert_eq!(result.records.len(), 7);
    assert_eq!(result.status(), BatchStatus::Records);

    // A's records precede B's.
    assert_eq!(result.records[0].source_file.as_deref(), Some("a.log"));
    assert_eq!(result.records[5].source_file.as_deref(), Some("b.log"));

    let allow = AccountAllowList::parse("acme");
    let filtered = filter_by_account(&result.records, &allow);
    assert_eq!(filtered.len(), 3);
    assert!(filtered
        .iter()
        .all(|r| r.account.as_deref() == Some("acme")));
    assert!(filtered
        .iter()
        .all(|r| r.source_file.as_deref() == Some("a.log")));
}

/// A failing file in the middle of the batch is surfaced per file while
/// its neighbours' records survive in order.
#[test]
fn e2e_failing_file_does_not_abort_batch() {
    let sample = read_fixture("iis_w3c_sample.log");
    let broken = read_fixture("no_fields_header.log");
    let reordered = read_fixture("iis_w3c_reordered.log");

    let result = aggregate(vec![
        FileParse::new("a.log", parser::parse(&sample, Some("a.log"))),
        FileParse::new("broken.log", parser::parse(&broken, Some("broken.log"))),
        FileParse::new("b.log", parser::parse(&reordered, Some("b.log"))),
    ]);

    assert_eq!(result.records.len(), 7, "A and B records both survive");
    assert_eq!(result.per_file_errors.len(), 1);
    assert_eq!(result.per_file_errors[0].label, "broken.log");
    assert_eq!(result.status(), BatchStatus::HadErrors);
}

// =============================================================================
// Full pipeline E2E
// =============================================================================

/// Running the pipeline over the fixtures directory exercises discovery,
/// lossy decode, parse, aggregation, and per-file error reporting in one
/// pass.
#[test]
fn e2e_pipeline_over_fixtures_directory() {
    let report = pipeline::run(
        &[fixtures_dir()],
        &AccountAllowList::default(),
        &DiscoveryConfig::default(),
    )
    .unwrap();

    // 5 records from the sample + 2 from the reordered file; the
    // header-only file parses to empty and the headerless one fails.
    assert_eq!(report.total_parsed, 7);
    assert_eq!(report.records.len(), 7);
    assert_eq!(report.status, BatchStatus::HadErrors);
    assert_eq!(report.per_file_errors.len(), 1);
    assert!(report.per_file_errors[0].label.ends_with("no_fields_header.log"));

    // Three parsed files: sample, reordered, and the empty header-only.
    assert_eq!(report.file_summaries.len(), 3);
}

#[test]
fn e2e_pipeline_filter_and_csv_export() {
    let report = pipeline::run(
        &[fixture("iis_w3c_sample.log"), fixture("iis_w3c_reordered.log")],
        &AccountAllowList::parse("initech"),
        &DiscoveryConfig::default(),
    )
    .unwrap();

    assert_eq!(report.total_parsed, 7);
    assert_eq!(report.records.len(), 2);

    let mut buf = Vec::new();
    let rows = export::export_csv(&report.records, &mut buf, &PathBuf::from("out.csv")).unwrap();
    assert_eq!(rows, 2);

    let output = String::from_utf8(buf).unwrap();
    let mut lines = output.lines();
    let header: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(header, export::EXPORT_COLUMNS);
    assert_eq!(header[export::time_taken_column()], "time-taken");

    let first_row: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(first_row[0], "2024-03-06 02:00:10");
    assert_eq!(first_row[export::time_taken_column()], "33");
    assert!(first_row.contains(&"initech"));
}

#[test]
fn e2e_pipeline_json_export_round_trips_accounts() {
    let report = pipeline::run(
        &[fixture("iis_w3c_sample.log")],
        &AccountAllowList::default(),
        &DiscoveryConfig::default(),
    )
    .unwrap();

    let mut buf = Vec::new();
    export::export_json(&report.records, &mut buf, &PathBuf::from("out.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();

    let accounts: Vec<_> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["account"].clone())
        .collect();
    assert_eq!(accounts.len(), 5);
    assert_eq!(accounts[0], "acme");
    assert!(accounts[3].is_null(), "no-@ request id exports a null account");
}
