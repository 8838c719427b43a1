//! Mock archive store for testing.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{ArchiveStore, PutOptions, StorageError, UploadReceipt};

/// A recorded upload for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub key: String,
    pub options: PutOptions,
    /// Entry names of the uploaded zip, sorted.
    pub entries: Vec<String>,
    pub size_bytes: u64,
}

/// Mock implementation of the ArchiveStore trait.
///
/// Reads the uploaded file to record its zip entries but stores nothing.
#[derive(Debug, Clone, Default)]
pub struct MockArchiveStore {
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    next_error: Arc<RwLock<Option<String>>>,
}

impl MockArchiveStore {
    /// Create a new mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads acknowledged so far.
    pub async fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    /// Configure the next upload to fail with `reason`.
    pub async fn set_next_error(&self, reason: &str) {
        *self.next_error.write().await = Some(reason.to_string());
    }
}

fn zip_entries(bytes: &[u8]) -> Vec<String> {
    let Ok(archive) = zip::ZipArchive::new(std::io::Cursor::new(bytes)) else {
        return Vec::new();
    };
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}

#[async_trait]
impl ArchiveStore for MockArchiveStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(
        &self,
        key: &str,
        source: &Path,
        options: PutOptions,
    ) -> Result<UploadReceipt, StorageError> {
        if let Some(reason) = self.next_error.write().await.take() {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                source: std::io::Error::other(reason),
            });
        }

        let bytes = tokio::fs::read(source).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::SourceNotFound {
                    path: source.to_path_buf(),
                }
            } else {
                StorageError::Io(e)
            }
        })?;

        self.uploads.write().await.push(RecordedUpload {
            key: key.to_string(),
            options,
            entries: zip_entries(&bytes),
            size_bytes: bytes.len() as u64,
        });

        Ok(UploadReceipt {
            key: key.to_string(),
            size_bytes: bytes.len() as u64,
            checksum: format!("{:x}", Sha256::digest(&bytes)),
            encrypted: options.server_side_encryption,
        })
    }
}
