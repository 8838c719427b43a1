//! Notification transport for published reports and error events.
//!
//! Two channels share one transport: the daily report goes to
//! subscribers through [`Notifier::publish`], and fatal run errors go out
//! as structured [`ErrorEvent`]s through [`Notifier::notify_error`].

mod error;
mod log_notifier;
mod traits;
mod types;
mod webhook;

pub use error::NotifyError;
pub use log_notifier::LogNotifier;
pub use traits::Notifier;
pub use types::{ErrorEvent, ReportMessage, Severity};
pub use webhook::WebhookNotifier;
