use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObjectStoreError {
    /// The object does not exist. Retrying will not help.
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Network or service failure. The same request may succeed later.
    #[error("Object store unavailable: {0}")]
    Transient(String),

    /// The store refused the write (permissions, invalid key, quota).
    #[error("Object store rejected the request: {0}")]
    Rejected(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ObjectStoreError {
    pub fn not_found(bucket: &str, key: &str) -> Self {
        ObjectStoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ObjectStoreError::NotFound { .. })
    }
}
