//! Mock notifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::notifier::{ErrorEvent, Notifier, NotifyError, ReportMessage};

/// Mock implementation of the Notifier trait.
///
/// Records delivered reports and error events. Either channel can be told
/// to fail until cleared.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    published: Arc<RwLock<Vec<ReportMessage>>>,
    events: Arc<RwLock<Vec<ErrorEvent>>>,
    publish_error: Arc<RwLock<Option<String>>>,
    event_error: Arc<RwLock<Option<String>>>,
}

impl MockNotifier {
    /// Create a new mock notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports delivered so far.
    pub async fn published(&self) -> Vec<ReportMessage> {
        self.published.read().await.clone()
    }

    /// Error events delivered so far.
    pub async fn events(&self) -> Vec<ErrorEvent> {
        self.events.read().await.clone()
    }

    /// Make report delivery fail with `reason`.
    pub async fn set_publish_error(&self, reason: &str) {
        *self.publish_error.write().await = Some(reason.to_string());
    }

    /// Make error-event delivery fail with `reason`.
    pub async fn set_event_error(&self, reason: &str) {
        *self.event_error.write().await = Some(reason.to_string());
    }

    fn unreachable(reason: &str) -> NotifyError {
        NotifyError::Unreachable {
            endpoint: "mock".to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn publish(&self, message: &ReportMessage) -> Result<(), NotifyError> {
        if let Some(reason) = self.publish_error.read().await.as_deref() {
            return Err(Self::unreachable(reason));
        }
        self.published.write().await.push(message.clone());
        Ok(())
    }

    async fn notify_error(&self, event: &ErrorEvent) -> Result<(), NotifyError> {
        if let Some(reason) = self.event_error.read().await.as_deref() {
            return Err(Self::unreachable(reason));
        }
        self.events.write().await.push(event.clone());
        Ok(())
    }
}
