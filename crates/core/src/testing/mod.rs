//! Testing utilities and mock implementations of the run collaborators.
//!
//! The mocks stand in for the report generator script, the notification
//! topic and the archive store, so a whole run can be exercised against a
//! temporary data root.
//!
//! # Example
//!
//! ```rust,ignore
//! use reporter_core::testing::{fixtures, MockArchiveStore, MockNotifier, MockReportGenerator};
//!
//! let layout = fixtures::layout(temp.path());
//! fixtures::write_registry(&layout, Dataset::ModisA, ProcessingType::Refined, "A1", &["a.nc"]);
//!
//! let generator = MockReportGenerator::new(layout.clone());
//! generator.set_counts("A1", 5, 5).await;
//! ```

mod mock_archive_store;
mod mock_generator;
mod mock_notifier;

pub use mock_archive_store::{MockArchiveStore, RecordedUpload};
pub use mock_generator::MockReportGenerator;
pub use mock_notifier::MockNotifier;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::artifact::{DataLayout, Dataset, ProcessingType, SummaryKey};
    use crate::config::ArtifactsConfig;

    /// Layout rooted at `root` with the default artifact prefixes.
    pub fn layout(root: &Path) -> DataLayout {
        DataLayout::new(root, &ArtifactsConfig::default())
    }

    /// A generated report for `key` in the generator's layout.
    ///
    /// Header lines sit on lines 1, 2 and 5, the counters on lines 6 and 7.
    pub fn report_text(key: SummaryKey, files_from_logs: u64, files_from_registry: u64) -> String {
        let (dataset, processing_type) = key;
        format!(
            "==========================================================================================\n\
             Product: list of {ptype} {ds_tag} L2P files processed\n\
             Date_printed: Tue Mar 05 06:00:00 2024\n\
             \n\
             Files:\n\
             Processing window: 2024-03-04\n\
             Number of files processed: {logs}, extracted from processing logs: ghrsst_{ds}_processing_log_archive_1.txt\n\
             Number of files processed: {registry}, extracted from registry: ghrsst_master_{ds}_{pt}_list_processed_files_1.dat\n\
             granule_0001.nc\n",
            ptype = processing_type.tag(),
            ds_tag = dataset.tag(),
            ds = dataset.as_str(),
            pt = processing_type.as_str(),
            logs = files_from_logs,
            registry = files_from_registry,
        )
    }

    /// A report stating that nothing was processed.
    pub fn no_files_report(key: SummaryKey) -> String {
        format!(
            "There were no {} {} files processed\n",
            key.1.tag(),
            key.0.tag()
        )
    }

    /// Writes a registry artifact listing `files` and returns its path.
    pub fn write_registry(
        layout: &DataLayout,
        dataset: Dataset,
        processing_type: ProcessingType,
        unique_id: &str,
        files: &[&str],
    ) -> PathBuf {
        std::fs::create_dir_all(layout.scratch_dir()).expect("create scratch dir");
        let path = layout.registry_path(dataset, processing_type, unique_id);
        let mut content = files.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        std::fs::write(&path, content).expect("write registry artifact");
        path
    }

    /// Writes a processing log whose first line marks `processing_type`.
    pub fn write_log(
        layout: &DataLayout,
        dataset: Dataset,
        processing_type: ProcessingType,
        unique_id: &str,
    ) -> PathBuf {
        let dir = layout.processing_logs_dir();
        std::fs::create_dir_all(&dir).expect("create processing log dir");
        let path = dir.join(format!(
            "{}{}_processing_log_archive_{}.txt",
            layout.log_prefix(),
            dataset.as_str(),
            unique_id
        ));
        std::fs::write(
            &path,
            format!(
                "Processing type: {}\nstarted job {}\nfinished\n",
                processing_type.tag(),
                unique_id
            ),
        )
        .expect("write processing log");
        path
    }
}
