//! Per-section summaries accumulated across work items.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::parser::{
    parse_report, ParsedReport, ReportParseError, LOGS_COUNTER_LINE, REGISTRY_COUNTER_LINE,
};
use crate::artifact::{summary_keys, DataLayout, Dataset, ProcessingType, SummaryKey, WorkItem};

/// Timestamp format used in report headers and the notification subject.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Rule opening a synthesized header block.
const SECTION_RULE: &str =
    "==========================================================================================";

/// Errors that can occur while aggregating reports.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// The generator succeeded but its report is missing.
    #[error("Cannot locate daily report: {path}")]
    MissingReport { path: PathBuf },

    /// Report did not follow the expected layout.
    #[error("Malformed daily report {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: ReportParseError,
    },

    /// Report could not be read.
    #[error("Failed to read daily report {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Accumulated report section for one dataset and processing type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub dataset: Dataset,
    pub processing_type: ProcessingType,
    /// Header captured from the first non-empty report.
    pub header: Option<String>,
    /// Header block written when no counted report was seen.
    pub synthesized_header: Option<String>,
    pub files_from_logs: u64,
    pub files_from_registry: u64,
    /// Work items whose reports were read.
    pub items_aggregated: usize,
    counted_reports: usize,
    log_glob: String,
    registry_glob: String,
}

impl ReportSummary {
    pub fn new(key: SummaryKey, layout: &DataLayout) -> Self {
        Self {
            dataset: key.0,
            processing_type: key.1,
            header: None,
            synthesized_header: None,
            files_from_logs: 0,
            files_from_registry: 0,
            items_aggregated: 0,
            counted_reports: 0,
            log_glob: layout.log_glob(key.0),
            registry_glob: layout.registry_glob(key.0),
        }
    }

    pub fn key(&self) -> SummaryKey {
        (self.dataset, self.processing_type)
    }

    /// Folds one parsed report into the summary.
    ///
    /// A counter total that no longer fits in `u64` is rejected and leaves
    /// the summary unchanged.
    pub fn absorb(&mut self, report: &ParsedReport) -> Result<(), ReportParseError> {
        if let ParsedReport::Counted {
            files_from_logs,
            files_from_registry,
            ..
        } = report
        {
            let logs = self
                .files_from_logs
                .checked_add(*files_from_logs)
                .ok_or(ReportParseError::CounterOverflow {
                    line: LOGS_COUNTER_LINE,
                })?;
            let registry = self
                .files_from_registry
                .checked_add(*files_from_registry)
                .ok_or(ReportParseError::CounterOverflow {
                    line: REGISTRY_COUNTER_LINE,
                })?;
            self.files_from_logs = logs;
            self.files_from_registry = registry;
            self.counted_reports += 1;
        }
        self.items_aggregated += 1;
        if self.header.is_none() {
            if let Some(header) = report.header() {
                self.header = Some(header.to_string());
            }
        }
        Ok(())
    }

    /// Completes the section, synthesizing a header block when no counted
    /// report contributed one.
    pub fn finish(&mut self, printed_at: DateTime<Utc>) {
        if self.counted_reports == 0 && self.synthesized_header.is_none() {
            self.synthesized_header = Some(format!(
                "{}\nProduct: list of {} {} L2P files processed\nDate_printed: {}\n",
                SECTION_RULE,
                self.processing_type.tag(),
                self.dataset.tag(),
                printed_at.format(REPORT_TIMESTAMP_FORMAT)
            ));
        }
        if self.files_from_logs != self.files_from_registry {
            warn!(
                dataset = %self.dataset,
                processing_type = %self.processing_type,
                "Counter divergence: {} files from logs, {} from registry",
                self.files_from_logs,
                self.files_from_registry
            );
        }
    }

    /// Renders the section as it appears in the published report.
    pub fn render(&self) -> String {
        let mut text = String::new();
        if let Some(header) = &self.header {
            text.push_str(header);
        }
        if let Some(header) = &self.synthesized_header {
            text.push_str(header);
        }
        text.push_str(&format!(
            "Number of files processed: {}, extracted from processing logs: {}\n",
            self.files_from_logs, self.log_glob
        ));
        text.push_str(&format!(
            "Number of files processed: {}, extracted from registry: {}\n",
            self.files_from_registry, self.registry_glob
        ));
        text
    }
}

/// Accumulates generated reports into the six report sections.
#[derive(Debug, Clone)]
pub struct Aggregator {
    summaries: BTreeMap<SummaryKey, ReportSummary>,
}

impl Aggregator {
    pub fn new(layout: &DataLayout) -> Self {
        Self {
            summaries: summary_keys()
                .map(|k| (k, ReportSummary::new(k, layout)))
                .collect(),
        }
    }

    /// Reads the report generated for `item` and folds it into its section.
    pub async fn aggregate(&mut self, item: &WorkItem, report_path: &Path) -> Result<(), AggregateError> {
        let text = match tokio::fs::read_to_string(report_path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AggregateError::MissingReport {
                    path: report_path.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(AggregateError::Read {
                    path: report_path.to_path_buf(),
                    source: e,
                })
            }
        };

        let malformed = |e: ReportParseError| AggregateError::Malformed {
            path: report_path.to_path_buf(),
            source: e,
        };
        let parsed = parse_report(&text).map_err(malformed)?;
        if parsed == ParsedReport::Empty {
            warn!("Daily report is empty: {}", report_path.display());
        }

        // every key is seeded in `new`
        if let Some(summary) = self.summaries.get_mut(&item.key()) {
            summary.absorb(&parsed).map_err(malformed)?;
        }
        info!("Read and processed report: {}", report_path.display());
        Ok(())
    }

    /// Finishes every section and returns them keyed by section.
    pub fn finish(mut self, printed_at: DateTime<Utc>) -> BTreeMap<SummaryKey, ReportSummary> {
        for summary in self.summaries.values_mut() {
            summary.finish(printed_at);
        }
        self.summaries
    }
}
