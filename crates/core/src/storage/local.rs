//! Filesystem-backed object store.

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info, warn};

use super::error::StorageError;
use super::traits::ArchiveStore;
use super::types::{PutOptions, UploadReceipt};

const BUFFER_SIZE: usize = 64 * 1024;

/// Metadata written next to every stored object.
#[derive(Debug, Serialize)]
struct ObjectMeta<'a> {
    key: &'a str,
    size_bytes: u64,
    sha256: &'a str,
    server_side_encryption: bool,
    stored_at: String,
}

/// Object store rooted at a local directory.
///
/// Objects land at `{root}/{key}` with a `{key}.meta.json` sidecar. The
/// object is copied to a `.partial` file, verified against the source
/// digest, then renamed into place.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path an object with `key` is stored at.
    pub fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        let bad = key.is_empty()
            || key.starts_with('/')
            || key.ends_with('/')
            || key.split('/').any(|s| s.is_empty() || s == "." || s == "..");
        if bad {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(())
    }

    async fn copy_with_checksum(
        key: &str,
        source: &Path,
        destination: &Path,
    ) -> Result<(u64, String), StorageError> {
        let source_file = File::open(source).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::SourceNotFound {
                    path: source.to_path_buf(),
                }
            } else {
                StorageError::Io(e)
            }
        })?;

        let write_failed = |e: std::io::Error| StorageError::WriteFailed {
            key: key.to_string(),
            source: e,
        };

        let dest_file = File::create(destination).await.map_err(write_failed)?;
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, source_file);
        let mut writer = BufWriter::with_capacity(BUFFER_SIZE, dest_file);
        let mut hasher = Sha256::new();
        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            let bytes_read = reader.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
            writer
                .write_all(&buffer[..bytes_read])
                .await
                .map_err(write_failed)?;
            total_bytes += bytes_read as u64;
        }

        writer.flush().await.map_err(write_failed)?;
        writer.get_ref().sync_all().await.map_err(write_failed)?;

        Ok((total_bytes, format!("{:x}", hasher.finalize())))
    }

    async fn file_checksum(path: &Path) -> Result<String, StorageError> {
        let file = File::open(path).await?;
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];
        loop {
            let bytes_read = reader.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[async_trait]
impl ArchiveStore for LocalObjectStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn upload(
        &self,
        key: &str,
        source: &Path,
        options: PutOptions,
    ) -> Result<UploadReceipt, StorageError> {
        Self::validate_key(key)?;

        let destination = self.object_path(key);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::WriteFailed {
                    key: key.to_string(),
                    source: e,
                })?;
        }

        let partial = with_suffix(&destination, ".partial");
        let (size_bytes, expected) = match Self::copy_with_checksum(key, source, &partial).await {
            Ok(copied) => copied,
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                return Err(e);
            }
        };

        let actual = Self::file_checksum(&partial).await?;
        if actual != expected {
            warn!(key = key, "Stored object failed verification, removing");
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::ChecksumMismatch {
                key: key.to_string(),
                expected,
                actual,
            });
        }

        fs::rename(&partial, &destination)
            .await
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                source: e,
            })?;

        let meta = ObjectMeta {
            key,
            size_bytes,
            sha256: &actual,
            server_side_encryption: options.server_side_encryption,
            stored_at: chrono::Utc::now().to_rfc3339(),
        };
        let meta_json = serde_json::to_vec_pretty(&meta).map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            source: std::io::Error::other(e),
        })?;
        fs::write(with_suffix(&destination, ".meta.json"), meta_json)
            .await
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                source: e,
            })?;

        debug!(path = %destination.display(), "Object written");
        info!(key = key, size_bytes, "Archive stored");

        Ok(UploadReceipt {
            key: key.to_string(),
            size_bytes,
            checksum: actual,
            encrypted: options.server_side_encryption,
        })
    }
}
