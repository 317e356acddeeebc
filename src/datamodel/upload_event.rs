use serde::{Deserialize, Serialize};

/// One object-created record from an upstream storage notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEvent {
    pub bucket: String,
    pub key: String,
}

impl UploadEvent {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}
