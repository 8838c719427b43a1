//! Locator for registry and processing-log artifacts.
//!
//! Registry artifacts in `scratch/` are the authoritative record of files
//! processed; processing logs in `logs/processing_logs/` are the execution
//! record. A job whose registry write failed but whose log succeeded shows
//! up only in the logs: the locator writes an empty placeholder registry for
//! it so every later stage sees both views.
//!
//! # Example
//!
//! ```ignore
//! use reporter_core::artifact::DataLayout;
//! use reporter_core::locator::Locator;
//!
//! let discovery = Locator::new(DataLayout::from_config(&config)).locate().await?;
//! println!("{} work items, {} anomalies", discovery.total, discovery.anomalies.len());
//! ```

mod scanner;

pub use scanner::{Discovery, Locator, LocatorError};
