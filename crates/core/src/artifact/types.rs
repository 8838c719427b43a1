//! Core types for datasets, processing types and work items.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A satellite data source feeding the ingestion pipeline.
///
/// Declaration order is the report order (Aqua, Terra, VIIRS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    ModisA,
    ModisT,
    Viirs,
}

impl Dataset {
    /// All datasets in report order.
    pub const ALL: [Dataset; 3] = [Dataset::ModisA, Dataset::ModisT, Dataset::Viirs];

    /// Lower-case name as it appears in artifact filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::ModisA => "modis_a",
            Dataset::ModisT => "modis_t",
            Dataset::Viirs => "viirs",
        }
    }

    /// Upper-case tag passed to the generator and used in report filenames.
    pub fn tag(&self) -> &'static str {
        match self {
            Dataset::ModisA => "MODIS_A",
            Dataset::ModisT => "MODIS_T",
            Dataset::Viirs => "VIIRS",
        }
    }

    /// The generator family this dataset belongs to.
    pub fn family(&self) -> DatasetFamily {
        match self {
            Dataset::ModisA | Dataset::ModisT => DatasetFamily::Modis,
            Dataset::Viirs => DatasetFamily::Generic,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing variant of a dataset pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingType {
    Quicklook,
    Refined,
}

impl ProcessingType {
    /// All processing types in report order.
    pub const ALL: [ProcessingType; 2] = [ProcessingType::Quicklook, ProcessingType::Refined];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingType::Quicklook => "quicklook",
            ProcessingType::Refined => "refined",
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ProcessingType::Quicklook => "QUICKLOOK",
            ProcessingType::Refined => "REFINED",
        }
    }

    /// Classifies a processing log by its first line.
    ///
    /// The marker is matched case-insensitively. Returns `None` when the
    /// line names neither type.
    pub fn from_marker(line: &str) -> Option<Self> {
        let line = line.to_ascii_lowercase();
        if line.contains("quicklook") {
            Some(ProcessingType::Quicklook)
        } else if line.contains("refined") {
            Some(ProcessingType::Refined)
        } else {
            None
        }
    }
}

impl fmt::Display for ProcessingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping of datasets by the generator variant that handles them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetFamily {
    Modis,
    Generic,
}

/// Key identifying one report section.
pub type SummaryKey = (Dataset, ProcessingType);

/// Every (dataset, processing type) combination in report order.
pub fn summary_keys() -> impl Iterator<Item = SummaryKey> {
    Dataset::ALL
        .into_iter()
        .flat_map(|d| ProcessingType::ALL.into_iter().map(move |t| (d, t)))
}

/// The reconciled unit of work driving generation and aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItem {
    pub dataset: Dataset,
    pub processing_type: ProcessingType,
    pub unique_id: String,
}

impl WorkItem {
    pub fn new(
        dataset: Dataset,
        processing_type: ProcessingType,
        unique_id: impl Into<String>,
    ) -> Self {
        Self {
            dataset,
            processing_type,
            unique_id: unique_id.into(),
        }
    }

    pub fn key(&self) -> SummaryKey {
        (self.dataset, self.processing_type)
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.dataset, self.processing_type, self.unique_id
        )
    }
}

/// On-disk artifacts that contributed to a work item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemArtifacts {
    /// Registry file, either discovered or synthesized as a placeholder.
    pub registry: Option<PathBuf>,
    /// Processing log, when one was found.
    pub log: Option<PathBuf>,
}

/// Reconciled work items for every (dataset, processing type).
///
/// Lists are kept free of duplicate ids and sorted by id, so "first item
/// processed" is deterministic.
#[derive(Debug, Clone, Default)]
pub struct WorkItemSet {
    items: BTreeMap<SummaryKey, Vec<WorkItem>>,
    artifacts: BTreeMap<WorkItem, ItemArtifacts>,
}

impl WorkItemSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a work item. Returns `false` if the id was already listed.
    pub fn insert(&mut self, item: WorkItem) -> bool {
        let list = self.items.entry(item.key()).or_default();
        if list.iter().any(|i| i.unique_id == item.unique_id) {
            return false;
        }
        let pos = list
            .binary_search_by(|i| i.unique_id.cmp(&item.unique_id))
            .unwrap_or_else(|p| p);
        list.insert(pos, item);
        true
    }

    pub fn contains(&self, key: SummaryKey, unique_id: &str) -> bool {
        self.items
            .get(&key)
            .is_some_and(|list| list.iter().any(|i| i.unique_id == unique_id))
    }

    /// Items for one report section, empty when nothing was processed.
    pub fn items(&self, key: SummaryKey) -> &[WorkItem] {
        self.items.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of reconciled work items.
    pub fn total(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Records the registry artifact backing a work item.
    pub fn record_registry(&mut self, item: &WorkItem, path: PathBuf) {
        self.artifacts.entry(item.clone()).or_default().registry = Some(path);
    }

    /// Records the processing log backing a work item.
    pub fn record_log(&mut self, item: &WorkItem, path: PathBuf) {
        self.artifacts.entry(item.clone()).or_default().log = Some(path);
    }

    pub fn artifacts(&self, item: &WorkItem) -> Option<&ItemArtifacts> {
        self.artifacts.get(item)
    }

    /// Every artifact path referenced by the set, registry before log,
    /// in report order.
    pub fn artifact_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for key in summary_keys() {
            for item in self.items(key) {
                if let Some(artifacts) = self.artifacts.get(item) {
                    paths.extend(artifacts.registry.iter().cloned());
                    paths.extend(artifacts.log.iter().cloned());
                }
            }
        }
        paths
    }
}

impl PartialOrd for WorkItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WorkItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.dataset, self.processing_type, &self.unique_id).cmp(&(
            other.dataset,
            other.processing_type,
            &other.unique_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_family() {
        assert_eq!(Dataset::ModisA.family(), DatasetFamily::Modis);
        assert_eq!(Dataset::ModisT.family(), DatasetFamily::Modis);
        assert_eq!(Dataset::Viirs.family(), DatasetFamily::Generic);
    }

    #[test]
    fn test_summary_key_order() {
        let keys: Vec<_> = summary_keys().collect();
        assert_eq!(keys.len(), 6);
        assert_eq!(keys[0], (Dataset::ModisA, ProcessingType::Quicklook));
        assert_eq!(keys[1], (Dataset::ModisA, ProcessingType::Refined));
        assert_eq!(keys[5], (Dataset::Viirs, ProcessingType::Refined));
    }

    #[test]
    fn test_marker_classification() {
        assert_eq!(
            ProcessingType::from_marker("Processing QUICKLOOK files"),
            Some(ProcessingType::Quicklook)
        );
        assert_eq!(
            ProcessingType::from_marker("refined run started"),
            Some(ProcessingType::Refined)
        );
        assert_eq!(ProcessingType::from_marker("nothing here"), None);
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut set = WorkItemSet::new();
        let key = (Dataset::Viirs, ProcessingType::Refined);
        assert!(set.insert(WorkItem::new(key.0, key.1, "b")));
        assert!(set.insert(WorkItem::new(key.0, key.1, "a")));
        assert!(!set.insert(WorkItem::new(key.0, key.1, "b")));

        let ids: Vec<_> = set.items(key).iter().map(|i| i.unique_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(set.total(), 2);
    }

    #[test]
    fn test_same_id_in_different_sections() {
        let mut set = WorkItemSet::new();
        assert!(set.insert(WorkItem::new(Dataset::ModisA, ProcessingType::Refined, "x")));
        assert!(set.insert(WorkItem::new(Dataset::ModisA, ProcessingType::Quicklook, "x")));
        assert_eq!(set.total(), 2);
    }

    #[test]
    fn test_empty_section() {
        let set = WorkItemSet::new();
        assert!(set.items((Dataset::Viirs, ProcessingType::Quicklook)).is_empty());
        assert!(set.is_empty());
    }

    #[test]
    fn test_artifact_paths() {
        let mut set = WorkItemSet::new();
        let item = WorkItem::new(Dataset::ModisT, ProcessingType::Refined, "42");
        set.insert(item.clone());
        set.record_registry(&item, PathBuf::from("/s/reg_42.dat"));
        set.record_log(&item, PathBuf::from("/l/log_42.txt"));

        assert_eq!(
            set.artifact_paths(),
            vec![PathBuf::from("/s/reg_42.dat"), PathBuf::from("/l/log_42.txt")]
        );
    }
}
