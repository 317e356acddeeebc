use crate::datamodel::ConnectionRecord;
use crate::registry::{ConnectionRegistry, RegistryError};
use async_trait::async_trait;

/// Registry whose backing table is unreachable: every call fails.
#[derive(Debug, Default)]
pub struct UnavailableRegistry;

impl UnavailableRegistry {
    fn error() -> RegistryError {
        RegistryError::Configuration("connection registry is unreachable".to_string())
    }
}

#[async_trait]
impl ConnectionRegistry for UnavailableRegistry {
    async fn create_or_migrate(&self) -> Result<(), RegistryError> {
        Err(Self::error())
    }

    async fn insert(&self, _record: &ConnectionRecord) -> Result<(), RegistryError> {
        Err(Self::error())
    }

    async fn remove(&self, _id: &str) -> Result<bool, RegistryError> {
        Err(Self::error())
    }

    async fn scan_all(&self) -> Result<Vec<ConnectionRecord>, RegistryError> {
        Err(Self::error())
    }

    async fn health_check(&self) -> Result<(), RegistryError> {
        Err(Self::error())
    }
}
