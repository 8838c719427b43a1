//! Generator module for per-item daily report text.
//!
//! Report content is produced by an external executable, one invocation
//! per work item. The executable is chosen by dataset family: MODIS Aqua and
//! Terra share one script, every other dataset uses the generic one. The
//! script writes `daily_report_{DATASET}_{TYPE}_{id}.txt` into the reports
//! directory.

mod error;
mod script;
mod traits;

pub use error::GeneratorError;
pub use script::ScriptReportGenerator;
pub use traits::ReportGenerator;
