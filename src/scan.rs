//! scan command: Extract receipt data from a list of verification URLs
//!
//! Reads the input file, fetches every receipt URL in order and writes
//! `Results-<input>.csv` plus `Errors-<input>` into the output folder.

use crate::classify::{classify_lines, BlankLines, LineKind, DEFAULT_HOST};
use crate::extract::{extract_receipt, ReceiptRecord};
use crate::fetch::HttpFetcher;
use crate::report::{ErrorStyle, Report, WrittenFiles};
pub use crate::report::INVALID_LINE_REASON;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Text file with one receipt URL per line
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Folder to write Results-* and Errors-* files into
    #[arg(value_name = "OUTPUT_DIR")]
    pub output: PathBuf,

    /// Receipt verification host that URLs must point at
    #[arg(long, env = "TRASCAN_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Timeout per URL in milliseconds (default: wait indefinitely)
    #[arg(long, env = "TRASCAN_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Report blank input lines as invalid instead of skipping them
    #[arg(long)]
    pub keep_blank: bool,

    /// Write failures as rows of the results CSV instead of an Errors file
    #[arg(long)]
    pub inline_errors: bool,
}

/// Configuration for a scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub host: String,
    pub timeout_ms: Option<u64>,
    pub blank_lines: BlankLines,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            timeout_ms: None,
            blank_lines: BlankLines::default(),
        }
    }
}

/// Summary printed to stdout after a run
#[derive(Debug, Serialize)]
pub struct ScanSummary {
    pub input: String,
    pub total: usize,
    pub ok: usize,
    pub failed: usize,
    pub files: WrittenFiles,
    pub finished: String,
}

/// Run the scan command
pub async fn run_scan(args: ScanArgs) -> Result<()> {
    validate_paths(&args.input, &args.output)?;

    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let content = String::from_utf8_lossy(&bytes);

    let config = ScanConfig {
        host: args.host,
        timeout_ms: args.timeout,
        blank_lines: if args.keep_blank {
            BlankLines::Report
        } else {
            BlankLines::Skip
        },
    };
    let style = if args.inline_errors {
        ErrorStyle::Inline
    } else {
        ErrorStyle::Separate
    };

    let report = scan(&content, &config).await?;

    let input_name = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    let files = report.write(&args.output, &input_name, style).await?;

    if let Some(path) = &files.results {
        eprintln!("Saved {} results into {}", report.ok_count(), path.display());
        if style == ErrorStyle::Inline && report.failed_count() > 0 {
            eprintln!(
                "There were {} errors, written as ERROR rows in {}",
                report.failed_count(),
                path.display()
            );
        }
    }
    if let Some(path) = &files.errors {
        eprintln!(
            "Saved {} error details into {}",
            report.failed_count(),
            path.display()
        );
    }

    let summary = ScanSummary {
        input: args.input.display().to_string(),
        total: report.outcomes().len(),
        ok: report.ok_count(),
        failed: report.failed_count(),
        files,
        finished: Utc::now().to_rfc3339(),
    };
    println!("{}", serde_json::to_string(&summary)?);

    eprintln!("Done: {}/{} OK", summary.ok, summary.total);

    Ok(())
}

/// Check the input file and output folder before doing any work
pub fn validate_paths(input: &Path, output: &Path) -> Result<()> {
    if !input.exists() {
        bail!("Provided input file path is invalid.");
    }
    if !input.is_file() {
        bail!("Provided input file path does not point to a file.");
    }
    if !output.exists() {
        bail!("Provided output folder path is invalid.");
    }
    if !output.is_dir() {
        bail!("Provided output folder path does not point to a folder.");
    }
    Ok(())
}

/// Classify `content`, then fetch and extract every receipt URL in order
///
/// Outcomes are recorded in input order. Per-line and per-URL failures stay
/// in the report; only a failure to set up the HTTP client aborts the run.
pub async fn scan(content: &str, config: &ScanConfig) -> Result<Report> {
    let lines: Vec<(LineKind, &str)> =
        classify_lines(content, &config.host, config.blank_lines).collect();
    let url_count = lines
        .iter()
        .filter(|(kind, _)| *kind == LineKind::Valid)
        .count();
    let invalid_count = lines.len() - url_count;

    if invalid_count == 0 {
        eprintln!("Found {} valid '{}' URLs.", url_count, config.host);
    } else {
        eprintln!(
            "Found {} valid '{}' URLs and {} invalid lines.",
            url_count, config.host, invalid_count
        );
    }

    let mut report = Report::new();
    if url_count == 0 {
        for (_, line) in lines {
            report.push_invalid(line);
        }
        return Ok(report);
    }

    let fetcher = HttpFetcher::new(config.timeout_ms.map(Duration::from_millis))
        .context("Failed to set up HTTP client")?;

    let mut i = 0;
    for (kind, line) in lines {
        if kind == LineKind::Invalid {
            tracing::debug!(%line, "skipping invalid line");
            report.push_invalid(line);
            continue;
        }

        i += 1;
        match fetch_receipt(&fetcher, line).await {
            Ok(record) => {
                eprintln!("{} of {}:\tExtracted data for {}", i, url_count, line);
                report.push_success(line, record);
            }
            Err(reason) => {
                eprintln!(
                    "{} of {}:\tFailed to extract data for {}: {}",
                    i, url_count, line, reason
                );
                report.push_failure(line, reason);
            }
        }
    }

    Ok(report)
}

async fn fetch_receipt(fetcher: &HttpFetcher, url: &str) -> Result<ReceiptRecord, String> {
    let html = fetcher.get_html(url).await.map_err(|e| e.to_string())?;
    extract_receipt(&html).map_err(|e| e.to_string())
}
