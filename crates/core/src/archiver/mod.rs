//! Archiver for the artifacts consumed by a report run.
//!
//! Registry files, processing logs and the persisted report are zipped into
//! `scratch/reports/archive/{YYYYMMDD}_daily_report_files.zip`, uploaded
//! under `{key_prefix}/{YYYY}/`, and only then removed locally together
//! with the contents of `scratch/reports/`.

mod bundle;
mod error;
mod purge;
mod store;

pub use bundle::write_bundle;
pub use error::ArchiveError;
pub use store::{ArchiveOutcome, Archiver, UploadedBundle};
