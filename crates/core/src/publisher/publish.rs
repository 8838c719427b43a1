//! Delivery and local persistence of the report message.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::{error, info};

use crate::artifact::DataLayout;
use crate::notifier::{Notifier, NotifyError, ReportMessage};

/// Errors that can occur while publishing the report.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The notification transport did not accept the message.
    #[error("Failed to publish report: {0}")]
    Delivery(#[from] NotifyError),

    /// The local copy could not be written.
    #[error("Failed to persist report to {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Hands the report to subscribers and keeps a local copy.
pub struct Publisher {
    layout: DataLayout,
    notifier: Arc<dyn Notifier>,
}

impl Publisher {
    pub fn new(layout: DataLayout, notifier: Arc<dyn Notifier>) -> Self {
        Self { layout, notifier }
    }

    /// Publishes `message` once and persists it for `date`.
    ///
    /// The copy is written even when delivery fails; a delivery failure
    /// takes precedence in the returned error.
    pub async fn publish(&self, message: &ReportMessage, date: NaiveDate) -> Result<PathBuf, PublishError> {
        let delivered = self.notifier.publish(message).await;
        if let Err(e) = &delivered {
            error!(notifier = self.notifier.name(), error = %e, "Report delivery failed");
        }

        let path = self.layout.persisted_report_path(date);
        let persisted = persist(&path, &message.to_file_text()).await;

        delivered?;
        persisted?;
        info!(path = %path.display(), "Report persisted");
        Ok(path)
    }
}

async fn persist(path: &Path, text: &str) -> Result<(), PublishError> {
    let persist_err = |e: std::io::Error| {
        error!(path = %path.display(), error = %e, "Failed to persist report");
        PublishError::Persist {
            path: path.to_path_buf(),
            source: e,
        }
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(persist_err)?;
    }
    fs::write(path, text).await.map_err(persist_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtifactsConfig;
    use crate::testing::MockNotifier;
    use tempfile::TempDir;

    fn message() -> ReportMessage {
        ReportMessage {
            subject: "Generate Daily Processing Report Tue Mar 05 07:15:02 2024 UTC".to_string(),
            body: "Generate Processing Report for Tue Mar 05 07:15:02 2024 UTC\n\n".to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[tokio::test]
    async fn test_publish_delivers_once_and_persists() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path(), &ArtifactsConfig::default());
        let notifier = MockNotifier::new();
        let publisher = Publisher::new(layout.clone(), Arc::new(notifier.clone()));

        let path = publisher.publish(&message(), date()).await.unwrap();

        assert_eq!(path, layout.persisted_report_path(date()));
        assert_eq!(notifier.published().await, vec![message()]);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            message().to_file_text()
        );
    }

    #[tokio::test]
    async fn test_persist_attempted_when_delivery_fails() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path(), &ArtifactsConfig::default());
        let notifier = MockNotifier::new();
        notifier.set_publish_error("topic unavailable").await;
        let publisher = Publisher::new(layout.clone(), Arc::new(notifier.clone()));

        let result = publisher.publish(&message(), date()).await;

        assert!(matches!(result, Err(PublishError::Delivery(_))));
        assert!(layout.persisted_report_path(date()).exists());
        assert!(notifier.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_persist_failure_after_delivery() {
        let temp = TempDir::new().unwrap();
        // A file where the scratch directory should be makes the write fail.
        std::fs::write(temp.path().join("scratch"), "not a dir").unwrap();
        let layout = DataLayout::new(temp.path(), &ArtifactsConfig::default());
        let notifier = MockNotifier::new();
        let publisher = Publisher::new(layout, Arc::new(notifier.clone()));

        let result = publisher.publish(&message(), date()).await;

        assert!(matches!(result, Err(PublishError::Persist { .. })));
        assert_eq!(notifier.published().await.len(), 1);
    }
}
