//! Aggregation of generated reports into per-section summaries.
//!
//! Each generated report carries a descriptive header and two counters:
//! files processed according to the processing logs and according to the
//! registry. Counters are summed per (dataset, processing type); the two
//! may differ and are reported side by side.

mod parser;
mod summary;

pub use parser::{parse_report, ParsedReport, ReportParseError};
pub use summary::{AggregateError, Aggregator, ReportSummary, REPORT_TIMESTAMP_FORMAT};
