//! Parsing of generated daily report text.

use thiserror::Error;

/// Marker the generator writes on line 0 when a run processed nothing.
const NO_FILES_MARKER: &str = "There were no";

/// Header lines captured from a counted report.
const HEADER_LINES: [usize; 3] = [1, 2, 5];

/// Line holding the count extracted from processing logs.
pub(super) const LOGS_COUNTER_LINE: usize = 6;

/// Line holding the count extracted from the registry.
pub(super) const REGISTRY_COUNTER_LINE: usize = 7;

/// A parsed report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReport {
    /// Report file had no lines.
    Empty,
    /// Generator reported that nothing was processed.
    NoFiles { header: String },
    /// Regular report with both counters.
    Counted {
        header: String,
        files_from_logs: u64,
        files_from_registry: u64,
    },
}

impl ParsedReport {
    /// Header text to capture into the summary, if any.
    pub fn header(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::NoFiles { header } | Self::Counted { header, .. } => Some(header),
        }
    }
}

/// Errors raised for reports that do not follow the fixed layout.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportParseError {
    #[error("report has {found} lines, expected at least {expected}")]
    TooShort { found: usize, expected: usize },

    #[error("line {line}: {reason}")]
    BadCounter { line: usize, reason: String },

    #[error("line {line}: counter total does not fit in 64 bits")]
    CounterOverflow { line: usize },
}

/// Parses report text into its header and counters.
pub fn parse_report(text: &str) -> Result<ParsedReport, ReportParseError> {
    if text.trim().is_empty() {
        return Ok(ParsedReport::Empty);
    }
    let lines: Vec<&str> = text.lines().collect();
    let first = lines[0];

    if first.contains(NO_FILES_MARKER) {
        return Ok(ParsedReport::NoFiles {
            header: format!("{}\n", first),
        });
    }

    let expected = REGISTRY_COUNTER_LINE + 1;
    if lines.len() < expected {
        return Err(ReportParseError::TooShort {
            found: lines.len(),
            expected,
        });
    }

    let mut header = String::new();
    for idx in HEADER_LINES {
        header.push_str(lines[idx]);
        header.push('\n');
    }

    Ok(ParsedReport::Counted {
        header,
        files_from_logs: parse_counter(lines[LOGS_COUNTER_LINE], LOGS_COUNTER_LINE)?,
        files_from_registry: parse_counter(lines[REGISTRY_COUNTER_LINE], REGISTRY_COUNTER_LINE)?,
    })
}

/// Extracts the integer from `<label>: <int>, ...`.
fn parse_counter(line: &str, idx: usize) -> Result<u64, ReportParseError> {
    let (_, rest) = line.split_once(": ").ok_or_else(|| ReportParseError::BadCounter {
        line: idx,
        reason: format!("missing ': ' in {:?}", line),
    })?;
    let token = rest.split(',').next().unwrap_or_default().trim();
    token.parse::<u64>().map_err(|e| ReportParseError::BadCounter {
        line: idx,
        reason: format!("invalid count {:?}: {}", token, e),
    })
}
