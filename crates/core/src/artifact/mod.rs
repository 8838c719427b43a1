//! Artifact model shared by every stage of a report run.
//!
//! A run consumes two classes of artifacts written by the ingestion
//! pipeline: registry files (`scratch/*.dat`) and processing logs
//! (`logs/processing_logs/*.txt`). Both are keyed by a unique run id and
//! reconciled into [`WorkItem`]s.

mod layout;
mod types;

pub use layout::{archive_file_name, unique_id_from_file_name, DataLayout};
pub use types::{
    summary_keys, Dataset, DatasetFamily, ItemArtifacts, ProcessingType, SummaryKey, WorkItem,
    WorkItemSet,
};
