use super::{ConnectionRegistry, RegistryError};
use crate::datamodel::ConnectionRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local registry. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    connections: RwLock<HashMap<String, ConnectionRecord>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for MemoryRegistry {
    async fn create_or_migrate(&self) -> Result<(), RegistryError> {
        Ok(())
    }

    async fn insert(&self, record: &ConnectionRecord) -> Result<(), RegistryError> {
        let mut connections = self.connections.write().await;
        connections.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool, RegistryError> {
        let mut connections = self.connections.write().await;
        Ok(connections.remove(id).is_some())
    }

    async fn scan_all(&self) -> Result<Vec<ConnectionRecord>, RegistryError> {
        let connections = self.connections.read().await;
        let mut snapshot: Vec<ConnectionRecord> = connections.values().cloned().collect();
        snapshot.sort_by(|a, b| {
            a.established_at
                .cmp(&b.established_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(snapshot)
    }

    async fn health_check(&self) -> Result<(), RegistryError> {
        Ok(())
    }
}
