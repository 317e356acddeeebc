use std::sync::Arc;

use anyhow::{Result, bail};

use super::ObjectStore;
use super::local::LocalObjectStore;

#[cfg(feature = "s3")]
use super::s3::S3ObjectStore;

pub async fn create_object_store_from_url(url: &str) -> Result<Arc<dyn ObjectStore>> {
    Ok(match url {
        s if s.starts_with("local:") => Arc::new(LocalObjectStore::connect(s)?),

        #[cfg(feature = "s3")]
        s if s.starts_with("s3") => Arc::new(S3ObjectStore::connect(s).await?),

        #[cfg(not(feature = "s3"))]
        s if s.starts_with("s3") => {
            bail!("S3 object store is not enabled. Enable with --features s3")
        }

        _ => bail!("Unsupported object store: {}", url),
    })
}
