//! Durable storage for archive bundles.
//!
//! The archiver only deletes local artifacts after [`ArchiveStore::upload`]
//! returns a receipt, so implementations must not acknowledge an object
//! before it is fully written.

mod error;
mod local;
mod traits;
mod types;

pub use error::StorageError;
pub use local::LocalObjectStore;
pub use traits::ArchiveStore;
pub use types::{PutOptions, UploadReceipt};
