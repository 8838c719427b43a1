//! Fatal run errors.

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

use crate::aggregator::{AggregateError, ReportParseError};
use crate::archiver::ArchiveError;
use crate::generator::GeneratorError;
use crate::locator::LocatorError;
use crate::notifier::NotifyError;
use crate::publisher::PublishError;
use crate::storage::StorageError;

/// Every condition that aborts a report run.
///
/// Each carries a description and contextual data for the error event.
#[derive(Debug, Error)]
pub enum RunError {
    /// The report generator exited unsuccessfully or could not be started.
    #[error("Report generator failed: {0}")]
    SubprocessFailure(#[source] GeneratorError),

    /// An expected report was not produced.
    #[error("Cannot locate daily report: {path}")]
    MissingArtifact { path: PathBuf },

    /// A report did not follow the expected layout.
    #[error("Malformed daily report {path}: {source}")]
    MalformedReport {
        path: PathBuf,
        #[source]
        source: ReportParseError,
    },

    /// The notification transport did not accept the report.
    #[error("Failed to publish report: {0}")]
    PublishFailure(#[source] NotifyError),

    /// The archive store did not acknowledge the bundle.
    #[error("Failed to upload archive {key}: {source}")]
    ArchiveUploadFailure {
        key: String,
        #[source]
        source: StorageError,
    },

    /// A local read, write or delete failed.
    #[error("Failed to {operation}: {reason}")]
    FilesystemFailure {
        operation: &'static str,
        path: Option<PathBuf>,
        reason: String,
    },
}

impl RunError {
    /// Short description for the error event.
    pub fn description(&self) -> String {
        match self {
            Self::SubprocessFailure(e) => e.description(),
            Self::MissingArtifact { .. } => "Cannot locate daily report".to_string(),
            Self::MalformedReport { .. } => "Malformed daily report".to_string(),
            Self::PublishFailure(_) => "Failed to publish daily report".to_string(),
            Self::ArchiveUploadFailure { .. } => "Failed to upload archive".to_string(),
            Self::FilesystemFailure { operation, .. } => format!("Failed to {}", operation),
        }
    }

    /// Context for the error event: command line, path or key.
    pub fn data(&self) -> String {
        match self {
            Self::SubprocessFailure(e) => e
                .command()
                .map(str::to_string)
                .unwrap_or_else(|| error_chain(e)),
            Self::MissingArtifact { path } => path.display().to_string(),
            Self::MalformedReport { path, source } => format!("{}: {}", path.display(), source),
            Self::PublishFailure(e) => error_chain(e),
            Self::ArchiveUploadFailure { key, source } => format!("{}: {}", key, error_chain(source)),
            Self::FilesystemFailure { path, reason, .. } => match path {
                Some(path) => format!("{}: {}", path.display(), reason),
                None => reason.clone(),
            },
        }
    }

    fn filesystem(operation: &'static str, path: Option<PathBuf>, err: &dyn StdError) -> Self {
        Self::FilesystemFailure {
            operation,
            path,
            reason: error_chain(err),
        }
    }
}

/// Joins an error and its sources with `": "`.
fn error_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

impl From<LocatorError> for RunError {
    fn from(e: LocatorError) -> Self {
        Self::filesystem("locate artifacts", e.path().map(PathBuf::from), &e)
    }
}

impl From<GeneratorError> for RunError {
    fn from(e: GeneratorError) -> Self {
        match e {
            GeneratorError::ReportDirectoryFailed { ref path, .. } => {
                Self::filesystem("create report directory", Some(path.clone()), &e)
            }
            other => Self::SubprocessFailure(other),
        }
    }
}

impl From<AggregateError> for RunError {
    fn from(e: AggregateError) -> Self {
        match e {
            AggregateError::MissingReport { path } => Self::MissingArtifact { path },
            AggregateError::Malformed { path, source } => Self::MalformedReport { path, source },
            AggregateError::Read { ref path, .. } => {
                Self::filesystem("read daily report", Some(path.clone()), &e)
            }
        }
    }
}

impl From<PublishError> for RunError {
    fn from(e: PublishError) -> Self {
        match e {
            PublishError::Delivery(source) => Self::PublishFailure(source),
            PublishError::Persist { ref path, .. } => {
                Self::filesystem("persist daily report", Some(path.clone()), &e)
            }
        }
    }
}

impl From<ArchiveError> for RunError {
    fn from(e: ArchiveError) -> Self {
        match e {
            ArchiveError::Upload { key, source } => Self::ArchiveUploadFailure { key, source },
            ArchiveError::Purge { ref path, .. } => {
                Self::filesystem("remove archived artifact", Some(path.clone()), &e)
            }
            other => {
                let path = other.path().map(PathBuf::from);
                Self::filesystem("create archive", path, &other)
            }
        }
    }
}
