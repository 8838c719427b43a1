//! End-to-end report run.
//!
//! `LOCATE -> GENERATE/AGGREGATE per item -> PUBLISH -> ARCHIVE -> DONE`.
//! Any fatal condition ends the run with one error event and exit status 1.
//! A run is never resumed; a failed run leaves its artifacts for the next
//! one.

mod error;
mod runner;
mod types;

pub use error::RunError;
pub use runner::ReportRun;
pub use types::{RunPhase, RunSummary, EXIT_FAILURE, EXIT_SUCCESS};
