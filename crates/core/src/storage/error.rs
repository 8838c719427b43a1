//! Error types for the storage module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while storing archives.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Source file not found.
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Object key is not acceptable to the backend.
    #[error("Invalid object key: {key}")]
    InvalidKey { key: String },

    /// Failed to write the object.
    #[error("Failed to write object {key}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored copy does not match the source.
    #[error("Checksum mismatch for {key}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
