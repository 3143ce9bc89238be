// iislens - main.rs
//
// CLI entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading
// 3. Logging initialisation (debug mode support)
// 4. Pipeline run and export

use clap::{Parser, ValueEnum};
use iislens::app::pipeline;
use iislens::core::export;
use iislens::core::filter::AccountAllowList;
use iislens::core::model::BatchStatus;
use iislens::platform::config::{load_config, PlatformPaths};
use iislens::util;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Export formats selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

/// iislens - Extract, filter, and export structured records from IIS
/// access logs.
///
/// Point iislens at log files or directories to parse IIS W3C logs into
/// tabular records, optionally restricted to an account allow-list derived
/// from the _RequestID column.
#[derive(Parser, Debug)]
#[command(name = "iislens", version, about)]
struct Cli {
    /// Log files and/or directories to process, in presentation order.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Comma-separated account allow-list (empty = export everything).
    #[arg(short = 'a', long = "accounts")]
    accounts: Option<String>,

    /// Output file (stdout if omitted).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Export format.
    #[arg(short = 'F', long = "format", value_enum)]
    format: Option<ExportFormat>,

    /// Alternative config.toml location.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config is loaded before logging so [logging] level can take effect.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    util::logging::init(cli.debug, config.logging.level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "iislens starting"
    );

    let allow = AccountAllowList::parse(
        cli.accounts
            .as_deref()
            .or(config.filter.accounts.as_deref())
            .unwrap_or(""),
    );

    let format = cli.format.unwrap_or_else(|| {
        // Config values are validated at load time, so anything other than
        // "json" here means csv.
        match config.export.format.as_deref() {
            Some("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    });

    let discovery = pipeline::discovery_config_from(&config);

    let report = match pipeline::run(&cli.paths, &allow, &discovery) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Pipeline failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    for warning in &report.warnings {
        eprintln!("Warning: {warning}");
    }
    for failure in &report.per_file_errors {
        let err: iislens::util::error::IisLensError = failure.clone().into();
        eprintln!("Error: {err}");
    }

    match report.status {
        BatchStatus::Records => {
            eprintln!(
                "Parsed {} record(s) from {} file(s); exporting {} after filtering.",
                report.total_parsed,
                report.file_summaries.len(),
                report.records.len()
            );
        }
        BatchStatus::Empty => {
            eprintln!("No records found. Check the log file contents.");
        }
        BatchStatus::HadErrors => {
            eprintln!(
                "{} file(s) failed to parse; {} record(s) from the remaining files, \
                 exporting {} after filtering.",
                report.per_file_errors.len(),
                report.total_parsed,
                report.records.len()
            );
        }
    }

    let export_result = match &cli.output {
        Some(path) => File::create(path)
            .map_err(|e| iislens::util::error::ExportError::Io {
                path: path.clone(),
                source: e,
            })
            .and_then(|file| {
                let writer = BufWriter::new(file);
                match format {
                    ExportFormat::Csv => export::export_csv(&report.records, writer, path),
                    ExportFormat::Json => export::export_json(&report.records, writer, path),
                }
            }),
        None => {
            let stdout = std::io::stdout();
            let label = Path::new("<stdout>");
            match format {
                ExportFormat::Csv => export::export_csv(&report.records, stdout.lock(), label),
                ExportFormat::Json => export::export_json(&report.records, stdout.lock(), label),
            }
        }
    };

    match export_result {
        Ok(rows) => {
            if let Some(path) = &cli.output {
                eprintln!("Exported {rows} record(s) to '{}'.", path.display());
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Export failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    // Per-file failures do not abort the batch, but a batch where nothing
    // parsed and something failed exits nonzero so scripts notice.
    if report.total_parsed == 0 && report.status == BatchStatus::HadErrors {
        std::process::exit(2);
    }
}
