use crate::object_store::{ObjectStore, ObjectStoreError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::RwLock;

/// In-memory object store with knobs for failure injection.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(String, String), Bytes>>,
    read_only_buckets: RwLock<HashSet<String>>,
    unavailable_keys: RwLock<HashSet<String>>,
    get_delays: RwLock<HashMap<String, Duration>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), body.into());
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Every write into `bucket` is rejected.
    pub async fn reject_writes_to(&self, bucket: &str) {
        self.read_only_buckets.write().await.insert(bucket.to_string());
    }

    /// Reads of `key` fail as a transient outage.
    pub async fn fail_reads_of(&self, key: &str) {
        self.unavailable_keys.write().await.insert(key.to_string());
    }

    /// Reads of `key` take `delay` before answering.
    pub async fn delay_reads_of(&self, key: &str, delay: Duration) {
        self.get_delays.write().await.insert(key.to_string(), delay);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, ObjectStoreError> {
        let delay = self.get_delays.read().await.get(key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable_keys.read().await.contains(key) {
            return Err(ObjectStoreError::Transient(format!(
                "simulated outage reading {}",
                key
            )));
        }
        self.object(bucket, key)
            .await
            .ok_or_else(|| ObjectStoreError::not_found(bucket, key))
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        _content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        if self.read_only_buckets.read().await.contains(bucket) {
            return Err(ObjectStoreError::Rejected(format!(
                "bucket {} is read-only",
                bucket
            )));
        }
        self.insert(bucket, key, body).await;
        Ok(())
    }
}
