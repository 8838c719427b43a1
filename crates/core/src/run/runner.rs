//! Report run driver.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use super::error::RunError;
use super::types::{RunPhase, RunSummary, EXIT_FAILURE, EXIT_SUCCESS};
use crate::aggregator::Aggregator;
use crate::archiver::{ArchiveOutcome, Archiver};
use crate::artifact::{summary_keys, DataLayout};
use crate::config::{Config, StorageConfig};
use crate::generator::{ReportGenerator, ScriptReportGenerator};
use crate::locator::Locator;
use crate::notifier::{ErrorEvent, Notifier};
use crate::publisher::{compose_message, Publisher};
use crate::storage::ArchiveStore;

/// One end-to-end report run.
///
/// Runs locate, generate and aggregate per item, publish, then archive.
/// [`ReportRun::execute`] is the single place a fatal error is logged and
/// sent as an error event.
pub struct ReportRun {
    run_id: String,
    layout: DataLayout,
    generator: Arc<dyn ReportGenerator>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn ArchiveStore>,
    storage: StorageConfig,
    printed_at: Option<DateTime<Utc>>,
}

impl ReportRun {
    pub fn new(
        layout: DataLayout,
        generator: Arc<dyn ReportGenerator>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn ArchiveStore>,
        storage: StorageConfig,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            layout,
            generator,
            notifier,
            store,
            storage,
            printed_at: None,
        }
    }

    /// Builds a run using the script generator from `config`.
    pub fn from_config(
        config: &Config,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn ArchiveStore>,
    ) -> Self {
        let layout = DataLayout::from_config(config);
        let generator = Arc::new(ScriptReportGenerator::new(
            config.generator.clone(),
            layout.clone(),
        ));
        Self::new(layout, generator, notifier, store, config.storage.clone())
    }

    /// Fixes the report timestamp instead of reading the clock.
    pub fn with_timestamp(mut self, printed_at: DateTime<Utc>) -> Self {
        self.printed_at = Some(printed_at);
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Runs every phase, stopping at the first fatal error.
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        let start = Instant::now();
        let printed_at = self.printed_at.unwrap_or_else(Utc::now);
        let date = printed_at.date_naive();
        info!(run_id = %self.run_id, phase = %RunPhase::Locate, "Starting report run");

        let discovery = Locator::new(self.layout.clone()).locate().await?;
        let work_items = discovery.work_items;

        let mut aggregator = Aggregator::new(&self.layout);
        for key in summary_keys() {
            for item in work_items.items(key) {
                info!(phase = %RunPhase::Generate, item = %item, generator = self.generator.name(), "Generating report");
                let report_path = self.generator.invoke(item).await?;
                info!(phase = %RunPhase::Aggregate, item = %item, "Aggregating report");
                aggregator.aggregate(item, &report_path).await?;
            }
        }
        let summaries = aggregator.finish(printed_at);

        info!(phase = %RunPhase::Publish, "Publishing report");
        let message = compose_message(&summaries, &self.layout, printed_at);
        let publisher = Publisher::new(self.layout.clone(), Arc::clone(&self.notifier));
        let report_path = publisher.publish(&message, date).await?;

        info!(phase = %RunPhase::Archive, store = self.store.name(), "Archiving artifacts");
        let archiver = Archiver::new(self.layout.clone(), Arc::clone(&self.store), &self.storage);
        let archive = match archiver.upload(&work_items, date).await? {
            Some(uploaded) => {
                info!(
                    phase = %RunPhase::Purge,
                    key = %uploaded.receipt().key,
                    files = uploaded.sources().len(),
                    "Purging archived artifacts"
                );
                archiver.purge(uploaded).await?
            }
            None => ArchiveOutcome::Skipped,
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %self.run_id,
            phase = %RunPhase::Done,
            duration_ms,
            "Execution time: {:.3}s",
            duration_ms as f64 / 1000.0
        );

        Ok(RunSummary {
            run_id: self.run_id.clone(),
            printed_at,
            work_items: discovery.total,
            anomalies: discovery.anomalies,
            report_path,
            archive,
            duration_ms,
        })
    }

    /// Runs to completion and returns the process exit status.
    ///
    /// A fatal error is logged and sent once as an error event. A failure
    /// to deliver that event is logged and does not change the status.
    pub async fn execute(&self) -> i32 {
        match self.run().await {
            Ok(_) => EXIT_SUCCESS,
            Err(e) => {
                let description = e.description();
                let data = e.data();
                error!(
                    run_id = %self.run_id,
                    phase = %RunPhase::ErrorNotify,
                    error = %e,
                    "{}: {}",
                    description,
                    data
                );

                let event = ErrorEvent::error(description, data, self.run_id.clone());
                if let Err(notify_err) = self.notifier.notify_error(&event).await {
                    error!(
                        notifier = self.notifier.name(),
                        error = %notify_err,
                        "Failed to send error notification"
                    );
                }
                EXIT_FAILURE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{Dataset, ProcessingType};
    use crate::notifier::Severity;
    use crate::testing::{fixtures, MockArchiveStore, MockNotifier, MockReportGenerator};
    use chrono::TimeZone;
    use tempfile::TempDir;

    struct Harness {
        _temp: TempDir,
        layout: DataLayout,
        generator: MockReportGenerator,
        notifier: MockNotifier,
        store: MockArchiveStore,
    }

    impl Harness {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let layout = fixtures::layout(temp.path());
            Self {
                generator: MockReportGenerator::new(layout.clone()),
                notifier: MockNotifier::new(),
                store: MockArchiveStore::new(),
                layout,
                _temp: temp,
            }
        }

        fn run(&self) -> ReportRun {
            ReportRun::new(
                self.layout.clone(),
                Arc::new(self.generator.clone()),
                Arc::new(self.notifier.clone()),
                Arc::new(self.store.clone()),
                StorageConfig::default(),
            )
            .with_timestamp(Utc.with_ymd_and_hms(2024, 3, 5, 7, 0, 0).unwrap())
        }
    }

    #[tokio::test]
    async fn test_empty_run_publishes_without_archiving_sources() {
        let h = Harness::new();

        let summary = h.run().run().await.unwrap();

        assert_eq!(summary.work_items, 0);
        assert_eq!(h.notifier.published().await.len(), 1);
        // Only the persisted report is bundled.
        let uploads = h.store.uploads().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].entries, vec!["20240305_daily_report.txt".to_string()]);
        assert!(h.generator.invocations().await.is_empty());
    }

    #[tokio::test]
    async fn test_items_invoked_in_report_order() {
        let h = Harness::new();
        fixtures::write_registry(&h.layout, Dataset::Viirs, ProcessingType::Refined, "3", &[]);
        fixtures::write_registry(&h.layout, Dataset::ModisA, ProcessingType::Refined, "2", &[]);
        fixtures::write_registry(&h.layout, Dataset::ModisA, ProcessingType::Quicklook, "1", &[]);

        h.run().run().await.unwrap();

        let ids: Vec<String> = h
            .generator
            .invocations()
            .await
            .into_iter()
            .map(|i| i.unique_id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_execute_notifies_once_on_failure() {
        let h = Harness::new();
        fixtures::write_registry(&h.layout, Dataset::ModisT, ProcessingType::Refined, "T1", &[]);
        h.generator.skip_report("T1").await;

        let run = h.run();
        let code = run.execute().await;

        assert_eq!(code, EXIT_FAILURE);
        let events = h.notifier.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].severity, Severity::Error);
        assert_eq!(events[0].description, "Cannot locate daily report");
        assert_eq!(events[0].run_id, run.run_id());
        assert!(h.notifier.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_event_delivery_failure_keeps_exit_status() {
        let h = Harness::new();
        fixtures::write_registry(&h.layout, Dataset::Viirs, ProcessingType::Quicklook, "V", &[]);
        h.generator.fail_on("V", 2, "boom").await;
        h.notifier.set_event_error("topic down").await;

        assert_eq!(h.run().execute().await, EXIT_FAILURE);
        assert!(h.notifier.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_report_is_fatal() {
        let h = Harness::new();
        fixtures::write_registry(&h.layout, Dataset::ModisA, ProcessingType::Refined, "M", &[]);
        h.generator.set_report("M", "header\nonly two lines\n").await;

        let err = h.run().run().await.unwrap_err();
        assert!(matches!(err, RunError::MalformedReport { .. }));
        assert!(h.store.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn test_counter_overflow_aborts_through_execute() {
        let h = Harness::new();
        let key = (Dataset::Viirs, ProcessingType::Refined);
        let big = u64::MAX / 2 + 1;
        for id in ["O1", "O2"] {
            fixtures::write_registry(&h.layout, key.0, key.1, id, &[]);
            h.generator.set_report(id, &fixtures::report_text(key, big, big)).await;
        }

        let run = h.run();
        assert_eq!(run.execute().await, EXIT_FAILURE);

        let events = h.notifier.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].description, "Malformed daily report");
        assert!(h.notifier.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_stops_before_archive() {
        let h = Harness::new();
        fixtures::write_registry(&h.layout, Dataset::ModisA, ProcessingType::Refined, "P", &[]);
        h.notifier.set_publish_error("topic down").await;

        let err = h.run().run().await.unwrap_err();

        assert!(matches!(err, RunError::PublishFailure(_)));
        assert!(h.store.uploads().await.is_empty());
        assert!(h.layout.persisted_report_path(chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()).exists());
    }

    #[tokio::test]
    async fn test_execute_success() {
        let h = Harness::new();
        fixtures::write_registry(&h.layout, Dataset::ModisA, ProcessingType::Refined, "S", &["a.nc"]);

        assert_eq!(h.run().execute().await, EXIT_SUCCESS);
        assert!(h.notifier.events().await.is_empty());
    }
}
