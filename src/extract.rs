//! Receipt field extraction from verification page HTML
//!
//! The verification page is not parsed as a DOM. Each field is anchored on a
//! fixed marker line and cut out by string splitting, so any change to the
//! page markup shows up as an `ExtractError` rather than a wrong value.

use std::fmt;
use thiserror::Error;

const RECEIPT_NO_MARKER: &str = "RECEIPT NO:";
const RECEIPT_DATE_MARKER: &str = "RECEIPT DATE:";
const TOTAL_MARKER: &str = "TOTAL INCL OF TAX:";
const VRN_MARKER: &str = "VRN:";
const NAME_MARKER: &str = "<center><h4><b>";

const BOLD_CLOSE: &str = "</b>";
const VALUE_OPEN: &str = "\">";

/// Length of `<center><h4><b>`
const NAME_PREFIX_CHARS: usize = 15;
/// Length of `</b></h4></center>`
const NAME_SUFFIX_CHARS: usize = 18;
/// Length of the `</td>` trailing the total
const TOTAL_SUFFIX_CHARS: usize = 5;

/// The five fields read from a receipt page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptRecord {
    pub name: String,
    pub vrn: String,
    pub receipt_no: String,
    pub receipt_date: String,
    pub total: String,
}

impl ReceiptRecord {
    /// CSV row in `COMPANY,VRN,RECEIPT,DATE,TOTAL` order (unescaped)
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.name, self.vrn, self.receipt_no, self.receipt_date, self.total
        )
    }
}

/// Line positions of each marker; `None` if the marker was not found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerIndices {
    pub receipt_no: Option<usize>,
    pub receipt_date: Option<usize>,
    /// Line holding the total value (the line after its marker)
    pub total: Option<usize>,
    pub vrn: Option<usize>,
    pub name: Option<usize>,
}

impl fmt::Display for MarkerIndices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |idx: Option<usize>| idx.map_or_else(|| "-1".to_string(), |i| i.to_string());
        write!(
            f,
            "receipt number index is {}, receipt date index is {}, total index is {}, VRN index is {}, and name index is {}",
            show(self.receipt_no),
            show(self.receipt_date),
            show(self.total),
            show(self.vrn),
            show(self.name)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Failed to extract all data indices: {0}.")]
    MissingMarkers(MarkerIndices),

    #[error("Failed to extract all data: {}.", describe_empty(.0))]
    EmptyFields(Vec<&'static str>),
}

fn describe_empty(fields: &[&str]) -> String {
    let verb = if fields.len() == 1 { "is" } else { "are" };
    format!("{} {} empty", fields.join(", "), verb)
}

/// Extract a receipt record from a verification page
pub fn extract_receipt(html: &str) -> Result<ReceiptRecord, ExtractError> {
    let lines: Vec<&str> = html
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let find = |marker: &str| lines.iter().position(|l| l.contains(marker));

    let indices = MarkerIndices {
        receipt_no: find(RECEIPT_NO_MARKER),
        receipt_date: find(RECEIPT_DATE_MARKER),
        total: find(TOTAL_MARKER).map(|i| i + 1),
        vrn: find(VRN_MARKER),
        name: find(NAME_MARKER),
    };

    let (Some(no_idx), Some(date_idx), Some(total_idx), Some(vrn_idx), Some(name_idx)) = (
        indices.receipt_no,
        indices.receipt_date,
        indices.total.filter(|&i| i < lines.len()),
        indices.vrn,
        indices.name,
    ) else {
        return Err(ExtractError::MissingMarkers(indices));
    };

    let record = ReceiptRecord {
        name: name_value(lines[name_idx]),
        vrn: after_last(lines[vrn_idx], BOLD_CLOSE).to_string(),
        receipt_no: after_last(lines[no_idx], BOLD_CLOSE).to_string(),
        receipt_date: after_last(lines[date_idx], BOLD_CLOSE).to_string(),
        total: total_value(lines[total_idx]),
    };

    let empty: Vec<&'static str> = [
        ("receipt number", &record.receipt_no),
        ("receipt date", &record.receipt_date),
        ("total", &record.total),
        ("VRN", &record.vrn),
        ("name", &record.name),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(field, _)| field)
    .collect();

    if !empty.is_empty() {
        return Err(ExtractError::EmptyFields(empty));
    }

    Ok(record)
}

/// Trimmed text after the last `sep`, or the whole line if `sep` is absent
fn after_last<'a>(line: &'a str, sep: &str) -> &'a str {
    line.rsplit(sep).next().unwrap_or(line).trim()
}

fn total_value(line: &str) -> String {
    let value = after_last(line, VALUE_OPEN);
    drop_last_chars(value, TOTAL_SUFFIX_CHARS).trim().to_string()
}

fn name_value(line: &str) -> String {
    let inner: String = line.chars().skip(NAME_PREFIX_CHARS).collect();
    drop_last_chars(&inner, NAME_SUFFIX_CHARS).trim().to_string()
}

/// `s` without its last `n` characters; empty if `s` is not longer than `n`
fn drop_last_chars(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return "";
    }
    match s.char_indices().nth(count - n) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
