//! Result accumulation and report files
//!
//! Successful records become rows of `Results-<input>.csv`; failures go to
//! `Errors-<input>` or, with inline errors, into the CSV itself.

use crate::extract::ReceiptRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "COMPANY,VRN,RECEIPT,DATE,TOTAL";
pub const INVALID_LINE_REASON: &str = "Not a valid TRA receipt URL";

/// Outcome for one input line or URL, kept in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { url: String, record: ReceiptRecord },
    /// Input line that is not a receipt URL
    Invalid { line: String },
    /// Receipt URL that could not be fetched or extracted
    Failure { source: String, reason: String },
}

/// Where failures are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorStyle {
    /// Separate `Errors-<input>` file
    #[default]
    Separate,
    /// `"ERROR: ..."` rows in the results CSV
    Inline,
}

/// Paths written by [`Report::write`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct WrittenFiles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<PathBuf>,
}

/// Ordered outcomes of one run
#[derive(Debug, Clone, Default)]
pub struct Report {
    outcomes: Vec<Outcome>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_success(&mut self, url: impl Into<String>, record: ReceiptRecord) {
        self.outcomes.push(Outcome::Success {
            url: url.into(),
            record,
        });
    }

    pub fn push_invalid(&mut self, line: impl Into<String>) {
        self.outcomes.push(Outcome::Invalid { line: line.into() });
    }

    pub fn push_failure(&mut self, source: impl Into<String>, reason: impl Into<String>) {
        self.outcomes.push(Outcome::Failure {
            source: source.into(),
            reason: reason.into(),
        });
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn successes(&self) -> impl Iterator<Item = (&str, &ReceiptRecord)> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Success { url, record } => Some((url.as_str(), record)),
            _ => None,
        })
    }

    /// Failures in error-log order: invalid lines first, then failed URLs
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        let invalid = self.outcomes.iter().filter_map(|o| match o {
            Outcome::Invalid { line } => Some((line.as_str(), INVALID_LINE_REASON)),
            _ => None,
        });
        let failed = self.outcomes.iter().filter_map(|o| match o {
            Outcome::Failure { source, reason } => Some((source.as_str(), reason.as_str())),
            _ => None,
        });
        invalid.chain(failed)
    }

    pub fn ok_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// Results CSV: header plus one row per success, or per outcome in input
    /// order when inline
    pub fn render_csv(&self, style: ErrorStyle) -> String {
        let rows = self.outcomes.iter().filter_map(|o| match (o, style) {
            (Outcome::Success { record, .. }, _) => Some(record.csv_row()),
            (Outcome::Invalid { line }, ErrorStyle::Inline) => Some(error_row(line, INVALID_LINE_REASON)),
            (Outcome::Failure { source, reason }, ErrorStyle::Inline) => Some(error_row(source, reason)),
            (_, ErrorStyle::Separate) => None,
        });

        std::iter::once(CSV_HEADER.to_string())
            .chain(rows)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Error log with one entry per failure
    pub fn render_errors(&self) -> String {
        self.failures()
            .map(|(source, reason)| format!("Error for '{}':\n{}\n", source, reason))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the report files next to each other in `dir`
    ///
    /// The results file is skipped when it would hold no rows, the error file
    /// when there are no failures or they are inlined.
    pub async fn write(&self, dir: &Path, input_name: &str, style: ErrorStyle) -> Result<WrittenFiles> {
        let mut written = WrittenFiles::default();

        let has_rows = match style {
            ErrorStyle::Separate => self.ok_count() > 0,
            ErrorStyle::Inline => !self.outcomes.is_empty(),
        };
        if has_rows {
            let path = dir.join(results_file_name(input_name));
            tokio::fs::write(&path, self.render_csv(style))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written.results = Some(path);
        }

        if style == ErrorStyle::Separate && self.failed_count() > 0 {
            let path = dir.join(errors_file_name(input_name));
            tokio::fs::write(&path, self.render_errors())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written.errors = Some(path);
        }

        Ok(written)
    }
}

fn error_row(source: &str, reason: &str) -> String {
    format!("\"ERROR: {}: {}\",,,,", source, reason)
}

pub fn results_file_name(input_name: &str) -> String {
    format!("Results-{}.csv", input_name)
}

pub fn errors_file_name(input_name: &str) -> String {
    format!("Errors-{}", input_name)
}
