//! Error types for the archiver module.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur while bundling, uploading or purging artifacts.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Failed to create the archive directory.
    #[error("Failed to create archive directory: {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to add a file to the bundle.
    #[error("Failed to add {path} to archive")]
    AddEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Zip encoding failed.
    #[error("Failed to write archive {path}: {message}")]
    Compress { path: PathBuf, message: String },

    /// The store did not acknowledge the upload.
    #[error("Failed to upload {key}")]
    Upload {
        key: String,
        #[source]
        source: StorageError,
    },

    /// A local artifact could not be removed after upload.
    #[error("Failed to remove {path}")]
    Purge {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    /// Path the failure relates to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::CreateDir { path, .. }
            | Self::AddEntry { path, .. }
            | Self::Compress { path, .. }
            | Self::Purge { path, .. } => Some(path),
            Self::Upload { .. } => None,
        }
    }
}
