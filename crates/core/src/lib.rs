pub mod aggregator;
pub mod archiver;
pub mod artifact;
pub mod config;
pub mod generator;
pub mod locator;
pub mod notifier;
pub mod publisher;
pub mod run;
pub mod storage;
pub mod testing;

pub use aggregator::{Aggregator, ReportSummary};
pub use archiver::{ArchiveOutcome, Archiver};
pub use artifact::{DataLayout, Dataset, ProcessingType, WorkItem, WorkItemSet};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LogFormat,
    NotifierBackend, StorageBackendKind,
};
pub use generator::{GeneratorError, ReportGenerator, ScriptReportGenerator};
pub use locator::{Discovery, Locator};
pub use notifier::{ErrorEvent, LogNotifier, Notifier, NotifyError, ReportMessage, WebhookNotifier};
pub use publisher::{compose_message, Publisher};
pub use run::{ReportRun, RunError, RunSummary, EXIT_FAILURE, EXIT_SUCCESS};
pub use storage::{ArchiveStore, LocalObjectStore, StorageError};
