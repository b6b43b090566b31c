//! Input line classification
//!
//! Splits raw input text into receipt URLs and everything else.

/// Default receipt verification host
pub const DEFAULT_HOST: &str = "verify.tra.go.tz";

/// What to do with blank input lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlankLines {
    /// Drop blank lines silently
    #[default]
    Skip,
    /// Treat blank lines as invalid entries
    Report,
}

/// Classification of a single trimmed line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Valid,
    Invalid,
}

/// Input split into receipt URLs and rejected lines, both in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub valid_urls: Vec<String>,
    pub invalid_lines: Vec<String>,
}

/// Classify one line against the receipt host
pub fn classify_line(line: &str, host: &str) -> LineKind {
    let is_receipt = ["http://", "https://"].iter().any(|scheme| {
        line.strip_prefix(scheme)
            .is_some_and(|rest| rest.starts_with(host))
    });

    if is_receipt {
        LineKind::Valid
    } else {
        LineKind::Invalid
    }
}

/// Trimmed input lines with their classification, in input order
pub fn classify_lines<'a>(
    text: &'a str,
    host: &'a str,
    blank_lines: BlankLines,
) -> impl Iterator<Item = (LineKind, &'a str)> + 'a {
    text.split('\n')
        .map(str::trim)
        .filter(move |line| !(line.is_empty() && blank_lines == BlankLines::Skip))
        .map(move |line| (classify_line(line, host), line))
}

/// Split raw text into trimmed lines and partition them
pub fn classify(text: &str, host: &str, blank_lines: BlankLines) -> Classified {
    let mut classified = Classified::default();

    for (kind, line) in classify_lines(text, host, blank_lines) {
        match kind {
            LineKind::Valid => classified.valid_urls.push(line.to_string()),
            LineKind::Invalid => classified.invalid_lines.push(line.to_string()),
        }
    }

    classified
}
