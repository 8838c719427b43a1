use thiserror::Error;

/// Errors that can occur while delivering notifications.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport could not be reached.
    #[error("Failed to reach notification endpoint {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },

    /// Transport answered with a non-success status.
    #[error("Notification endpoint {endpoint} rejected message with status {status}: {body}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Message could not be encoded.
    #[error("Failed to encode notification: {0}")]
    Encode(String),
}
