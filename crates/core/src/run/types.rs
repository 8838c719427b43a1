use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;

use crate::archiver::ArchiveOutcome;
use crate::artifact::WorkItem;

/// Exit status of a successful run.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit status of a run that hit a fatal condition.
pub const EXIT_FAILURE: i32 = 1;

/// Stage a run is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Locate,
    Generate,
    Aggregate,
    Publish,
    Archive,
    Purge,
    Done,
    ErrorNotify,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Locate => "locate",
            RunPhase::Generate => "generate",
            RunPhase::Aggregate => "aggregate",
            RunPhase::Publish => "publish",
            RunPhase::Archive => "archive",
            RunPhase::Purge => "purge",
            RunPhase::Done => "done",
            RunPhase::ErrorNotify => "error_notify",
        };
        f.write_str(name)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    /// Timestamp printed in the report.
    pub printed_at: DateTime<Utc>,
    pub work_items: usize,
    /// Items reconciled from processing logs only.
    pub anomalies: Vec<WorkItem>,
    /// Persisted copy of the published report.
    pub report_path: PathBuf,
    pub archive: ArchiveOutcome,
    pub duration_ms: u64,
}
