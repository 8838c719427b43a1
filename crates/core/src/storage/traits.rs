//! Trait definitions for the storage module.

use async_trait::async_trait;
use std::path::Path;

use super::error::StorageError;
use super::types::{PutOptions, UploadReceipt};

/// Durable object storage for archive bundles.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Uploads the file at `source` under `key`.
    ///
    /// A returned receipt means the object is durable; callers may delete
    /// their local copy.
    async fn upload(
        &self,
        key: &str,
        source: &Path,
        options: PutOptions,
    ) -> Result<UploadReceipt, StorageError>;
}
