//! Message types handed to the notification transport.

use serde::{Deserialize, Serialize};

/// The composed daily report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMessage {
    pub subject: String,
    pub body: String,
}

impl ReportMessage {
    /// Text persisted alongside the published message.
    pub fn to_file_text(&self) -> String {
        format!("{}\n\n{}", self.subject, self.body)
    }
}

/// Severity of an operational event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
}

/// Structured event sent on the error side channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub severity: Severity,
    pub description: String,
    pub data: String,
    pub run_id: String,
}

impl ErrorEvent {
    pub fn error(description: impl Into<String>, data: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            description: description.into(),
            data: data.into(),
            run_id: run_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_text() {
        let message = ReportMessage {
            subject: "Subject".to_string(),
            body: "Body\n".to_string(),
        };
        assert_eq!(message.to_file_text(), "Subject\n\nBody\n");
    }

    #[test]
    fn test_error_event_serialization() {
        let event = ErrorEvent::error("Cannot locate daily report", "", "run-1");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["severity"], "ERROR");
        assert_eq!(json["run_id"], "run-1");
    }
}
