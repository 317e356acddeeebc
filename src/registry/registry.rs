use async_trait::async_trait;
use std::fmt::Debug;

use super::RegistryError;
use crate::datamodel::ConnectionRecord;

/// Durable table of live push endpoints, keyed by connection id.
///
/// Per id the lifecycle is `Absent -> Live` on connect and `Live -> Absent`
/// on disconnect or when a broadcast finds the endpoint gone.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync + Debug {
    async fn create_or_migrate(&self) -> Result<(), RegistryError>;

    /// Upsert by id. A second insert for the same id replaces the
    /// timestamp and never creates a duplicate row.
    async fn insert(&self, record: &ConnectionRecord) -> Result<(), RegistryError>;

    /// Returns `Ok(false)` when the id was not registered. Errors are kept
    /// for failures of the table itself.
    async fn remove(&self, id: &str) -> Result<bool, RegistryError>;

    /// Point-in-time snapshot of every live connection.
    ///
    /// Inserts and removals running concurrently with the scan may or may
    /// not show up in the snapshot. A broadcast built from it can therefore
    /// target a connection that was just removed, which the push target then
    /// reports as gone.
    async fn scan_all(&self) -> Result<Vec<ConnectionRecord>, RegistryError>;

    async fn health_check(&self) -> Result<(), RegistryError>;
}
