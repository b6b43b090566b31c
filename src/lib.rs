//! trascan: TRA receipt verification scraper
//!
//! Pipeline:
//! - classify: split input into receipt URLs and invalid lines
//! - fetch: GET each receipt page
//! - extract: read the five receipt fields from the page HTML
//! - report: write Results-*.csv and Errors-* files

pub mod classify;
pub mod extract;
pub mod fetch;
pub mod report;
pub mod scan;

pub use classify::{classify, BlankLines, Classified, LineKind, DEFAULT_HOST};
pub use extract::{extract_receipt, ExtractError, ReceiptRecord};
pub use fetch::{FetchError, HttpFetcher};
pub use report::{ErrorStyle, Outcome, Report, WrittenFiles};
pub use scan::{scan, ScanConfig, ScanSummary};
