//! Directory scanning and registry/log reconciliation.

use regex_lite::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::artifact::{
    unique_id_from_file_name, DataLayout, Dataset, ProcessingType, WorkItem, WorkItemSet,
};

/// Errors that can occur while locating artifacts.
#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    /// Failed to list an artifact directory.
    #[error("Failed to read directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read the first line of a processing log.
    #[error("Failed to read processing log {path}")]
    ReadLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a registry placeholder.
    #[error("Failed to create registry placeholder {path}")]
    Placeholder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact name pattern could not be compiled.
    #[error("Invalid artifact pattern: {0}")]
    Pattern(String),
}

impl LocatorError {
    /// Path the failure relates to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::ReadDir { path, .. } | Self::ReadLog { path, .. } | Self::Placeholder { path, .. } => {
                Some(path)
            }
            Self::Pattern(_) => None,
        }
    }
}

/// Result of reconciling registry and log artifacts.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Reconciled work items with their artifact paths.
    pub work_items: WorkItemSet,
    /// Items found only in processing logs, for which a placeholder was written.
    pub anomalies: Vec<WorkItem>,
    /// Processing logs left in place because they carry no run id or type
    /// marker. They are neither counted nor archived.
    pub skipped_logs: Vec<PathBuf>,
    /// Total number of reconciled work items.
    pub total: usize,
}

/// Discovers work items from registry and processing-log artifacts.
///
/// `locate` consumes the locator; a second pass in the same run would list
/// the placeholders it synthesized as registry artifacts.
pub struct Locator {
    layout: DataLayout,
}

impl Locator {
    pub fn new(layout: DataLayout) -> Self {
        Self { layout }
    }

    /// Scans both artifact classes and reconciles them into one set.
    pub async fn locate(self) -> Result<Discovery, LocatorError> {
        let scratch = self.layout.scratch_dir();
        let logs_dir = self.layout.processing_logs_dir();
        let scratch_files = list_file_names(&scratch).await?;
        let log_files = list_file_names(&logs_dir).await?;

        let mut work_items = WorkItemSet::new();
        let mut anomalies = Vec::new();
        let mut skipped_logs = Vec::new();

        for dataset in Dataset::ALL {
            for processing_type in [ProcessingType::Refined, ProcessingType::Quicklook] {
                let pattern = registry_pattern(dataset, processing_type)?;
                let mut found = 0usize;
                for name in scratch_files.iter().filter(|n| pattern.is_match(n)) {
                    let Some(id) = unique_id_from_file_name(name) else {
                        warn!("Skipping registry artifact without run id: {}", name);
                        continue;
                    };
                    let item = WorkItem::new(dataset, processing_type, id);
                    if work_items.insert(item.clone()) {
                        work_items.record_registry(&item, scratch.join(name));
                        found += 1;
                    }
                }
                if found > 0 {
                    info!(
                        "Found {} {} registry artifacts for dataset: {}",
                        found,
                        processing_type,
                        dataset.tag()
                    );
                }
            }

            let pattern = log_pattern(self.layout.log_prefix(), dataset)?;
            for name in log_files.iter().filter(|n| pattern.is_match(n)) {
                let path = logs_dir.join(name);
                let Some(id) = unique_id_from_file_name(name) else {
                    warn!("Skipping processing log without run id: {}", name);
                    skipped_logs.push(path);
                    continue;
                };
                let Some(processing_type) = classify_log(&path).await? else {
                    warn!(
                        "Processing log {} has no quicklook/refined marker, skipping",
                        path.display()
                    );
                    skipped_logs.push(path);
                    continue;
                };

                let item = WorkItem::new(dataset, processing_type, id);
                if work_items.insert(item.clone()) {
                    let placeholder = self.layout.registry_path(dataset, processing_type, id);
                    write_placeholder(&placeholder).await?;
                    work_items.record_registry(&item, placeholder.clone());
                    warn!(
                        dataset = %dataset,
                        processing_type = %processing_type,
                        unique_id = %id,
                        "Processing log without registry artifact, wrote placeholder {}",
                        placeholder.display()
                    );
                    anomalies.push(item.clone());
                }
                work_items.record_log(&item, path);
            }
        }

        let total = work_items.total();
        info!(
            "Located {} work items ({} reconciled from logs only)",
            total,
            anomalies.len()
        );
        if !skipped_logs.is_empty() {
            warn!(
                skipped = skipped_logs.len(),
                "Processing logs left in place without being counted"
            );
        }

        Ok(Discovery {
            work_items,
            anomalies,
            skipped_logs,
            total,
        })
    }
}

/// Pattern equivalent to `*{dataset}*{type}*.dat`.
fn registry_pattern(dataset: Dataset, processing_type: ProcessingType) -> Result<Regex, LocatorError> {
    let pattern = format!(
        r"^.*{}.*{}.*\.dat$",
        regex_lite::escape(dataset.as_str()),
        regex_lite::escape(processing_type.as_str())
    );
    Regex::new(&pattern).map_err(|e| LocatorError::Pattern(e.to_string()))
}

/// Pattern equivalent to `{prefix}{dataset}*`.
fn log_pattern(prefix: &str, dataset: Dataset) -> Result<Regex, LocatorError> {
    let pattern = format!(
        r"^{}{}.*$",
        regex_lite::escape(prefix),
        regex_lite::escape(dataset.as_str())
    );
    Regex::new(&pattern).map_err(|e| LocatorError::Pattern(e.to_string()))
}

/// Lists regular file names in `dir`, sorted. A missing directory is empty.
async fn list_file_names(dir: &Path) -> Result<Vec<String>, LocatorError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Artifact directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(LocatorError::ReadDir {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    };

    let mut names = Vec::new();
    loop {
        let entry = entries.next_entry().await.map_err(|e| LocatorError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let Some(entry) = entry else { break };

        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if is_file {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Reads the first line of a processing log to determine its type.
///
/// The line is decoded lossily, so invalid UTF-8 only matters if it hides
/// the marker.
async fn classify_log(path: &Path) -> Result<Option<ProcessingType>, LocatorError> {
    let read_err = |e: std::io::Error| LocatorError::ReadLog {
        path: path.to_path_buf(),
        source: e,
    };
    let file = File::open(path).await.map_err(read_err)?;
    let mut first = Vec::new();
    BufReader::new(file)
        .read_until(b'\n', &mut first)
        .await
        .map_err(read_err)?;
    Ok(ProcessingType::from_marker(&String::from_utf8_lossy(&first)))
}

async fn write_placeholder(path: &Path) -> Result<(), LocatorError> {
    match OpenOptions::new().write(true).create_new(true).open(path).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(LocatorError::Placeholder {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
