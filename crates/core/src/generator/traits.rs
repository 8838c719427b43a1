//! Trait definitions for the generator module.

use async_trait::async_trait;
use std::path::PathBuf;

use super::error::GeneratorError;
use crate::artifact::WorkItem;

/// Produces the report artifact for one work item.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Returns the name of this generator implementation.
    fn name(&self) -> &str;

    /// Generates the report for `item` and returns where it was written.
    ///
    /// Success means the collaborator exited cleanly; the caller still
    /// checks that the report exists.
    async fn invoke(&self, item: &WorkItem) -> Result<PathBuf, GeneratorError>;
}
