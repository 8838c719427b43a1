use serde::{Deserialize, Serialize};

/// Options for an archive upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutOptions {
    /// Request encryption at rest from the backend.
    pub server_side_encryption: bool,
}

/// Acknowledgement that an object is durably stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub key: String,
    pub size_bytes: u64,
    /// Hex SHA-256 of the stored object.
    pub checksum: String,
    pub encrypted: bool,
}
