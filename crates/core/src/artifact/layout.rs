//! Filesystem layout and artifact naming conventions.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use super::types::{Dataset, ProcessingType, WorkItem};
use crate::config::{ArtifactsConfig, Config};

/// Resolves every path the reporter reads or writes under the data root.
#[derive(Debug, Clone)]
pub struct DataLayout {
    data_root: PathBuf,
    registry_prefix: String,
    log_prefix: String,
}

impl DataLayout {
    pub fn new(data_root: impl Into<PathBuf>, artifacts: &ArtifactsConfig) -> Self {
        Self {
            data_root: data_root.into(),
            registry_prefix: artifacts.registry_prefix.clone(),
            log_prefix: artifacts.log_prefix.clone(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.paths.data_root, &config.artifacts)
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn log_prefix(&self) -> &str {
        &self.log_prefix
    }

    /// Directory holding registry artifacts.
    pub fn scratch_dir(&self) -> PathBuf {
        self.data_root.join("scratch")
    }

    /// Directory holding generated and persisted reports.
    pub fn reports_dir(&self) -> PathBuf {
        self.scratch_dir().join("reports")
    }

    /// Directory holding local bundle archives before upload.
    pub fn archive_dir(&self) -> PathBuf {
        self.reports_dir().join("archive")
    }

    /// Directory holding processing log artifacts.
    pub fn processing_logs_dir(&self) -> PathBuf {
        self.data_root.join("logs").join("processing_logs")
    }

    /// Path of the placeholder written for a log-only work item.
    pub fn registry_path(&self, dataset: Dataset, processing_type: ProcessingType, id: &str) -> PathBuf {
        self.scratch_dir().join(format!(
            "{}{}_{}_list_processed_files_{}.dat",
            self.registry_prefix,
            dataset.as_str(),
            processing_type.as_str(),
            id
        ))
    }

    /// Glob naming the processing logs of `dataset` in the report.
    pub fn log_glob(&self, dataset: Dataset) -> String {
        format!("{}{}_processing_log_archive_*.txt", self.log_prefix, dataset.as_str())
    }

    /// Glob naming the registry artifacts of `dataset` in the report.
    pub fn registry_glob(&self, dataset: Dataset) -> String {
        format!(
            "{}{}_*_list_processed_files_*.dat",
            self.registry_prefix,
            dataset.as_str()
        )
    }

    /// Path the generator writes the report for `item` to.
    pub fn report_path(&self, item: &WorkItem) -> PathBuf {
        self.reports_dir().join(format!(
            "daily_report_{}_{}_{}.txt",
            item.dataset.tag(),
            item.processing_type.tag(),
            item.unique_id
        ))
    }

    /// Path of the persisted copy of the published report.
    pub fn persisted_report_path(&self, date: NaiveDate) -> PathBuf {
        self.reports_dir()
            .join(format!("{}_daily_report.txt", date.format("%Y%m%d")))
    }

    /// Path of the local bundle archive.
    pub fn archive_path(&self, date: NaiveDate) -> PathBuf {
        self.archive_dir().join(archive_file_name(date))
    }
}

/// File name of the bundle archive for `date`.
pub fn archive_file_name(date: NaiveDate) -> String {
    format!("{}_daily_report_files.zip", date.format("%Y%m%d"))
}

/// Extracts the run identifier from an artifact file name.
///
/// The id is the last underscore-delimited segment, without its extension.
pub fn unique_id_from_file_name(file_name: &str) -> Option<&str> {
    let segment = file_name.rsplit('_').next()?;
    let id = segment.split('.').next()?;
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> DataLayout {
        DataLayout::new("/mnt/data", &ArtifactsConfig::default())
    }

    #[test]
    fn test_unique_id_extraction() {
        assert_eq!(
            unique_id_from_file_name("ghrsst_master_modis_a_refined_list_processed_files_1700000000.dat"),
            Some("1700000000")
        );
        assert_eq!(
            unique_id_from_file_name("viirs_processing_log_archive_abc.txt"),
            Some("abc")
        );
        assert_eq!(unique_id_from_file_name("trailing_.dat"), None);
    }

    #[test]
    fn test_directories() {
        let layout = layout();
        assert_eq!(layout.scratch_dir(), PathBuf::from("/mnt/data/scratch"));
        assert_eq!(layout.reports_dir(), PathBuf::from("/mnt/data/scratch/reports"));
        assert_eq!(
            layout.archive_dir(),
            PathBuf::from("/mnt/data/scratch/reports/archive")
        );
        assert_eq!(
            layout.processing_logs_dir(),
            PathBuf::from("/mnt/data/logs/processing_logs")
        );
    }

    #[test]
    fn test_report_path() {
        let item = WorkItem::new(Dataset::ModisT, ProcessingType::Quicklook, "77");
        assert_eq!(
            layout().report_path(&item),
            PathBuf::from("/mnt/data/scratch/reports/daily_report_MODIS_T_QUICKLOOK_77.txt")
        );
    }

    #[test]
    fn test_registry_placeholder_path() {
        let path = layout().registry_path(Dataset::Viirs, ProcessingType::Refined, "9");
        assert_eq!(
            path,
            PathBuf::from("/mnt/data/scratch/ghrsst_master_viirs_refined_list_processed_files_9.dat")
        );
    }

    #[test]
    fn test_globs_follow_configured_prefixes() {
        let artifacts = ArtifactsConfig {
            registry_prefix: "sst_reg_".to_string(),
            log_prefix: "sst_".to_string(),
        };
        let layout = DataLayout::new("/mnt/data", &artifacts);
        assert_eq!(
            layout.log_glob(Dataset::ModisT),
            "sst_modis_t_processing_log_archive_*.txt"
        );
        assert_eq!(
            layout.registry_glob(Dataset::ModisT),
            "sst_reg_modis_t_*_list_processed_files_*.dat"
        );
    }

    #[test]
    fn test_date_stamped_paths() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            layout().persisted_report_path(date),
            PathBuf::from("/mnt/data/scratch/reports/20240307_daily_report.txt")
        );
        assert_eq!(archive_file_name(date), "20240307_daily_report_files.zip");
    }
}
