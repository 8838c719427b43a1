//! Bundle, upload and purge of consumed artifacts.

use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{error, info, warn};

use super::bundle::write_bundle;
use super::error::ArchiveError;
use super::purge::{clear_dir, remove_file};
use crate::artifact::{archive_file_name, DataLayout, WorkItemSet};
use crate::config::StorageConfig;
use crate::storage::{ArchiveStore, PutOptions, UploadReceipt};

/// What the archive step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Nothing to archive; no bundle was created.
    Skipped,
    /// Bundle uploaded and local artifacts removed.
    Stored {
        receipt: UploadReceipt,
        /// Files placed in the bundle.
        files: usize,
    },
}

/// A bundle the store has acknowledged. Only [`Archiver::upload`] creates
/// one, so local files are never purged without a receipt.
#[derive(Debug)]
pub struct UploadedBundle {
    receipt: UploadReceipt,
    entries: usize,
    sources: Vec<PathBuf>,
    archive_path: PathBuf,
}

impl UploadedBundle {
    pub fn receipt(&self) -> &UploadReceipt {
        &self.receipt
    }

    /// Local files that went into the bundle.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

/// Bundles the day's artifacts into durable storage.
pub struct Archiver {
    layout: DataLayout,
    store: Arc<dyn ArchiveStore>,
    key_prefix: String,
    options: PutOptions,
}

impl Archiver {
    pub fn new(layout: DataLayout, store: Arc<dyn ArchiveStore>, config: &StorageConfig) -> Self {
        Self {
            layout,
            store,
            key_prefix: config.key_prefix.trim_matches('/').to_string(),
            options: PutOptions {
                server_side_encryption: config.server_side_encryption,
            },
        }
    }

    /// Storage key of the bundle for `date`.
    pub fn storage_key(&self, date: NaiveDate) -> String {
        format!("{}/{}/{}", self.key_prefix, date.year(), archive_file_name(date))
    }

    /// Consumed artifacts that still exist, plus the persisted report.
    pub async fn collect(&self, artifacts: &WorkItemSet, date: NaiveDate) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();
        let candidates = artifacts
            .artifact_paths()
            .into_iter()
            .chain(std::iter::once(self.layout.persisted_report_path(date)));

        for path in candidates {
            if !seen.insert(path.clone()) {
                continue;
            }
            if fs::metadata(&path).await.is_ok() {
                files.push(path);
            } else {
                warn!(path = %path.display(), "Artifact no longer present, not archiving");
            }
        }
        files
    }

    /// Bundles the artifacts of this run and uploads the bundle.
    ///
    /// Returns `None` when there is nothing to archive. On any upload
    /// failure the artifacts and the local bundle are left as they are.
    pub async fn upload(
        &self,
        artifacts: &WorkItemSet,
        date: NaiveDate,
    ) -> Result<Option<UploadedBundle>, ArchiveError> {
        let sources = self.collect(artifacts, date).await;
        if sources.is_empty() {
            info!("No files to archive");
            return Ok(None);
        }

        let archive_dir = self.layout.archive_dir();
        fs::create_dir_all(&archive_dir)
            .await
            .map_err(|e| ArchiveError::CreateDir {
                path: archive_dir.clone(),
                source: e,
            })?;

        let archive_path = self.layout.archive_path(date);
        let entries = write_bundle(archive_path.clone(), sources.clone()).await?;
        info!(archive = %archive_path.display(), entries, "Archive created");

        let key = self.storage_key(date);
        let receipt = self
            .store
            .upload(&key, &archive_path, self.options)
            .await
            .map_err(|e| {
                error!(key = %key, error = %e, "Archive upload failed, keeping local files");
                ArchiveError::Upload {
                    key: key.clone(),
                    source: e,
                }
            })?;
        info!(
            store = self.store.name(),
            key = %receipt.key,
            size_bytes = receipt.size_bytes,
            "Archive uploaded"
        );

        Ok(Some(UploadedBundle {
            receipt,
            entries,
            sources,
            archive_path,
        }))
    }

    /// Removes the sources and local copy of an uploaded bundle, then
    /// clears `scratch/reports/`.
    pub async fn purge(&self, bundle: UploadedBundle) -> Result<ArchiveOutcome, ArchiveError> {
        for file in &bundle.sources {
            remove_file(file).await?;
        }
        remove_file(&bundle.archive_path).await?;
        let cleared = clear_dir(&self.layout.reports_dir()).await?;
        info!(removed = bundle.sources.len(), cleared, "Removed archived artifacts");

        Ok(ArchiveOutcome::Stored {
            receipt: bundle.receipt,
            files: bundle.entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{Dataset, ProcessingType, WorkItem};
    use crate::config::ArtifactsConfig;
    use crate::testing::MockArchiveStore;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn setup() -> (TempDir, DataLayout, WorkItemSet) {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path(), &ArtifactsConfig::default());
        std::fs::create_dir_all(layout.scratch_dir()).unwrap();
        std::fs::create_dir_all(layout.processing_logs_dir()).unwrap();

        let mut set = WorkItemSet::new();
        let item = WorkItem::new(Dataset::ModisA, ProcessingType::Refined, "A1");
        set.insert(item.clone());
        let registry = layout.registry_path(Dataset::ModisA, ProcessingType::Refined, "A1");
        std::fs::write(&registry, "f1\n").unwrap();
        set.record_registry(&item, registry);
        let log = layout
            .processing_logs_dir()
            .join("ghrsst_modis_a_processing_log_archive_A1.txt");
        std::fs::write(&log, "REFINED\n").unwrap();
        set.record_log(&item, log);

        (temp, layout, set)
    }

    fn archiver(layout: &DataLayout, store: &MockArchiveStore) -> Archiver {
        Archiver::new(
            layout.clone(),
            Arc::new(store.clone()),
            &StorageConfig::default(),
        )
    }

    #[test]
    fn test_storage_key() {
        let layout = DataLayout::new("/mnt/data", &ArtifactsConfig::default());
        let archiver = archiver(&layout, &MockArchiveStore::new());
        assert_eq!(
            archiver.storage_key(date()),
            "archive/reporter/2024/20240305_daily_report_files.zip"
        );
    }

    #[tokio::test]
    async fn test_skips_when_nothing_to_archive() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path(), &ArtifactsConfig::default());
        let store = MockArchiveStore::new();

        let uploaded = archiver(&layout, &store)
            .upload(&WorkItemSet::new(), date())
            .await
            .unwrap();

        assert!(uploaded.is_none());
        assert!(store.uploads().await.is_empty());
        assert!(!layout.archive_path(date()).exists());
    }

    #[tokio::test]
    async fn test_archive_uploads_and_purges() {
        let (_temp, layout, set) = setup();
        std::fs::create_dir_all(layout.reports_dir()).unwrap();
        std::fs::write(layout.persisted_report_path(date()), "report").unwrap();
        std::fs::write(layout.reports_dir().join("daily_report_MODIS_A_REFINED_A1.txt"), "x").unwrap();
        let store = MockArchiveStore::new();

        let archiver = archiver(&layout, &store);
        let uploaded = archiver.upload(&set, date()).await.unwrap().unwrap();
        assert_eq!(uploaded.sources().len(), 3);
        for path in uploaded.sources() {
            assert!(path.exists(), "{} is kept until purge", path.display());
        }
        let outcome = archiver.purge(uploaded).await.unwrap();

        match outcome {
            ArchiveOutcome::Stored { files, receipt } => {
                assert_eq!(files, 3);
                assert_eq!(receipt.key, "archive/reporter/2024/20240305_daily_report_files.zip");
                assert!(receipt.encrypted);
            }
            other => panic!("expected Stored, got {other:?}"),
        }

        let uploads = store.uploads().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(
            uploads[0].entries,
            vec![
                "20240305_daily_report.txt".to_string(),
                "ghrsst_master_modis_a_refined_list_processed_files_A1.dat".to_string(),
                "ghrsst_modis_a_processing_log_archive_A1.txt".to_string(),
            ]
        );

        for path in set.artifact_paths() {
            assert!(!path.exists(), "{} should be removed", path.display());
        }
        assert!(layout.reports_dir().is_dir());
        assert_eq!(std::fs::read_dir(layout.reports_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_everything() {
        let (_temp, layout, set) = setup();
        let store = MockArchiveStore::new();
        store.set_next_error("bucket unavailable").await;

        let result = archiver(&layout, &store).upload(&set, date()).await;

        assert!(matches!(result, Err(ArchiveError::Upload { .. })));
        for path in set.artifact_paths() {
            assert!(path.exists(), "{} should be kept", path.display());
        }
        assert!(layout.archive_path(date()).exists());
    }
}
