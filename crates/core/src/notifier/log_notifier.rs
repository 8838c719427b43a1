//! Notifier that writes messages to the log instead of a topic.

use async_trait::async_trait;
use tracing::{error, info};

use super::error::NotifyError;
use super::traits::Notifier;
use super::types::{ErrorEvent, ReportMessage};

/// Logs published reports and error events.
///
/// Used for dry runs and hosts without a topic endpoint.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    topic: String,
}

impl LogNotifier {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, message: &ReportMessage) -> Result<(), NotifyError> {
        info!(topic = %self.topic, subject = %message.subject, "{}", message.body);
        Ok(())
    }

    async fn notify_error(&self, event: &ErrorEvent) -> Result<(), NotifyError> {
        error!(
            topic = %self.topic,
            run_id = %event.run_id,
            severity = ?event.severity,
            data = %event.data,
            "{}",
            event.description
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notifier = LogNotifier::new("reporter");
        let message = ReportMessage {
            subject: "subject".to_string(),
            body: "body".to_string(),
        };
        assert!(notifier.publish(&message).await.is_ok());
        assert!(notifier
            .notify_error(&ErrorEvent::error("failed", "", "run"))
            .await
            .is_ok());
        assert_eq!(notifier.name(), "log");
    }
}
