use std::sync::Arc;

use anyhow::{Result, bail};

use super::ConnectionRegistry;
use super::memory::MemoryRegistry;

#[cfg(feature = "sqlite")]
use super::sqlite::SqliteRegistry;

pub async fn create_registry_from_connection_string(
    connection_string: &str,
) -> Result<Arc<dyn ConnectionRegistry>> {
    Ok(match connection_string {
        #[cfg(feature = "sqlite")]
        s if s.starts_with("sqlite:") => Arc::new(SqliteRegistry::connect(s).await?),

        #[cfg(not(feature = "sqlite"))]
        s if s.starts_with("sqlite:") => {
            bail!("SQLite registry backend is not enabled. Enable with --features sqlite")
        }

        s if s.starts_with("memory:") => Arc::new(MemoryRegistry::new()),

        _ => bail!("Unsupported registry type: {}", connection_string),
    })
}
