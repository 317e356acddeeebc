use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

use super::ObjectStoreError;

#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, ObjectStoreError>;

    /// Write an object, replacing any previous version under the same key.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), ObjectStoreError>;
}
