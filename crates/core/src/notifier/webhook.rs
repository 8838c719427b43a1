//! HTTP webhook notification transport.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::error::NotifyError;
use super::traits::Notifier;
use super::types::{ErrorEvent, ReportMessage};
use crate::config::WebhookConfig;

/// Body posted for a published report.
#[derive(Debug, Serialize)]
struct ReportPayload<'a> {
    topic: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// Body posted for an error event.
#[derive(Debug, Serialize)]
struct EventPayload<'a> {
    topic: &'a str,
    #[serde(flatten)]
    event: &'a ErrorEvent,
}

/// Posts JSON messages to a topic endpoint.
pub struct WebhookNotifier {
    client: Client,
    config: WebhookConfig,
    topic: String,
}

impl WebhookNotifier {
    /// Create a new WebhookNotifier for `topic`.
    pub fn new(config: WebhookConfig, topic: impl Into<String>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| NotifyError::Unreachable {
                endpoint: config.url.clone(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            config,
            topic: topic.into(),
        })
    }

    async fn post<T: Serialize + ?Sized + Sync>(&self, payload: &T) -> Result<(), NotifyError> {
        let endpoint = self.config.url.as_str();
        let response = self
            .client
            .post(endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| NotifyError::Unreachable {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                endpoint: endpoint.to_string(),
                status,
                body: body.chars().take(200).collect(),
            });
        }

        debug!(endpoint = endpoint, "Notification delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn publish(&self, message: &ReportMessage) -> Result<(), NotifyError> {
        self.post(&ReportPayload {
            topic: &self.topic,
            subject: &message.subject,
            message: &message.body,
        })
        .await?;
        info!("Message published to topic: {}", self.topic);
        Ok(())
    }

    async fn notify_error(&self, event: &ErrorEvent) -> Result<(), NotifyError> {
        self.post(&EventPayload {
            topic: &self.topic,
            event,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_payload_shape() {
        let payload = ReportPayload {
            topic: "reporter",
            subject: "Generate Daily Processing Report",
            message: "body",
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["topic"], "reporter");
        assert_eq!(json["subject"], "Generate Daily Processing Report");
        assert_eq!(json["message"], "body");
    }

    #[test]
    fn test_event_payload_is_flat() {
        let event = ErrorEvent::error("Report generator failed", "cmd", "run-9");
        let payload = EventPayload {
            topic: "reporter",
            event: &event,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["topic"], "reporter");
        assert_eq!(json["severity"], "ERROR");
        assert_eq!(json["description"], "Report generator failed");
        assert_eq!(json["data"], "cmd");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let notifier = WebhookNotifier::new(
            WebhookConfig {
                url: "http://127.0.0.1:1/topics/reporter".to_string(),
                timeout_secs: 2,
            },
            "reporter",
        )
        .unwrap();

        let message = ReportMessage {
            subject: "s".to_string(),
            body: "b".to_string(),
        };
        let result = notifier.publish(&message).await;
        assert!(matches!(result, Err(NotifyError::Unreachable { .. })));
    }
}
