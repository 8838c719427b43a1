use async_trait::async_trait;

use super::error::NotifyError;
use super::types::{ErrorEvent, ReportMessage};

/// Publish/subscribe transport for reports and error events.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns the name of this notifier implementation.
    fn name(&self) -> &str;

    /// Publishes the daily report to subscribers.
    async fn publish(&self, message: &ReportMessage) -> Result<(), NotifyError>;

    /// Sends a structured operational event.
    async fn notify_error(&self, event: &ErrorEvent) -> Result<(), NotifyError>;
}
