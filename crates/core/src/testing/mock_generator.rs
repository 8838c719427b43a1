//! Mock report generator for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::fixtures;
use crate::artifact::{DataLayout, WorkItem};
use crate::generator::{GeneratorError, ReportGenerator};

/// How the mock answers an invocation for one unique id.
#[derive(Debug, Clone)]
enum Canned {
    Report(String),
    Counts { files_from_logs: u64, files_from_registry: u64 },
    /// Exit cleanly without writing a report.
    NoReport,
    Fail { status: i32, stderr: String },
}

/// Mock implementation of the ReportGenerator trait.
///
/// Writes a canned report to the path the real generator would use.
/// Unconfigured items get a report counting one file in each counter.
///
/// # Example
///
/// ```rust,ignore
/// use reporter_core::testing::MockReportGenerator;
///
/// let generator = MockReportGenerator::new(layout.clone());
/// generator.set_counts("A1", 5, 5).await;
/// generator.fail_on("A2", 2, "bad input").await;
/// ```
#[derive(Debug, Clone)]
pub struct MockReportGenerator {
    layout: DataLayout,
    canned: Arc<RwLock<HashMap<String, Canned>>>,
    invocations: Arc<RwLock<Vec<WorkItem>>>,
}

impl MockReportGenerator {
    /// Create a mock writing reports under `layout`.
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            canned: Arc::new(RwLock::new(HashMap::new())),
            invocations: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Use `text` as the report for `unique_id`.
    pub async fn set_report(&self, unique_id: &str, text: impl Into<String>) {
        self.canned
            .write()
            .await
            .insert(unique_id.to_string(), Canned::Report(text.into()));
    }

    /// Produce a counted report for `unique_id` with the given counters.
    pub async fn set_counts(&self, unique_id: &str, files_from_logs: u64, files_from_registry: u64) {
        self.canned.write().await.insert(
            unique_id.to_string(),
            Canned::Counts {
                files_from_logs,
                files_from_registry,
            },
        );
    }

    /// Exit cleanly for `unique_id` but write no report.
    pub async fn skip_report(&self, unique_id: &str) {
        self.canned
            .write()
            .await
            .insert(unique_id.to_string(), Canned::NoReport);
    }

    /// Fail the invocation for `unique_id` with an exit status.
    pub async fn fail_on(&self, unique_id: &str, status: i32, stderr: &str) {
        self.canned.write().await.insert(
            unique_id.to_string(),
            Canned::Fail {
                status,
                stderr: stderr.to_string(),
            },
        );
    }

    /// Items invoked so far, in call order.
    pub async fn invocations(&self) -> Vec<WorkItem> {
        self.invocations.read().await.clone()
    }
}

#[async_trait]
impl ReportGenerator for MockReportGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn invoke(&self, item: &WorkItem) -> Result<PathBuf, GeneratorError> {
        self.invocations.write().await.push(item.clone());
        let canned = self.canned.read().await.get(&item.unique_id).cloned();
        let path = self.layout.report_path(item);
        let command = format!(
            "mock {} {} {} today",
            item.unique_id,
            item.dataset.tag(),
            item.processing_type.tag()
        );

        let canned = canned.unwrap_or(Canned::Counts {
            files_from_logs: 1,
            files_from_registry: 1,
        });
        let text = match canned {
            Canned::Fail { status, stderr } => {
                return Err(GeneratorError::failed(command, Some(status), &stderr, "mock"))
            }
            Canned::NoReport => return Ok(path),
            Canned::Report(text) => text,
            Canned::Counts {
                files_from_logs,
                files_from_registry,
            } => fixtures::report_text(item.key(), files_from_logs, files_from_registry),
        };

        let reports_dir = self.layout.reports_dir();
        tokio::fs::create_dir_all(&reports_dir)
            .await
            .map_err(|e| GeneratorError::ReportDirectoryFailed {
                path: reports_dir.clone(),
                source: e,
            })?;
        tokio::fs::write(&path, text)
            .await
            .map_err(|e| GeneratorError::Io { command, source: e })?;
        Ok(path)
    }
}
