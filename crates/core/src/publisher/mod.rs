//! Publisher for the consolidated daily report.

mod compose;
mod publish;

pub use compose::compose_message;
pub use publish::{PublishError, Publisher};
