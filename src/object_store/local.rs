use super::{ObjectStore, ObjectStoreError};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Filesystem-backed store laid out as `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn connect(connection_string: &str) -> Result<Self, ObjectStoreError> {
        let root = connection_string
            .strip_prefix("local:")
            .ok_or_else(|| {
                ObjectStoreError::Configuration(format!(
                    "Not a local object store URL: {}",
                    connection_string
                ))
            })?
            .trim_start_matches("//");
        if root.is_empty() {
            return Err(ObjectStoreError::Configuration(
                "Local object store requires a directory, e.g. local:./data".to_string(),
            ));
        }
        Ok(Self::new(root))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, ObjectStoreError> {
        // Keys come from the outside world and must stay under the bucket.
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if bucket.is_empty() || key.is_empty() || escapes || bucket.contains(['/', '\\']) {
            return Err(ObjectStoreError::Rejected(format!(
                "Invalid object location: {}/{}",
                bucket, key
            )));
        }
        Ok(self.root.join(bucket).join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, ObjectStoreError> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(ObjectStoreError::not_found(bucket, key))
            }
            Err(err) => Err(ObjectStoreError::Transient(format!(
                "Failed to read {}: {}",
                path.display(),
                err
            ))),
        }
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        _content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                ObjectStoreError::Rejected(format!(
                    "Failed to create {}: {}",
                    parent.display(),
                    err
                ))
            })?;
        }
        tokio::fs::write(&path, &body).await.map_err(|err| {
            ObjectStoreError::Rejected(format!("Failed to write {}: {}", path.display(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());

        store
            .put("thumbs", "nested/cat.jpg.jpeg", Bytes::from_static(b"jpeg"), "image/jpeg")
            .await
            .unwrap();
        let content = store.get("thumbs", "nested/cat.jpg.jpeg").await.unwrap();
        assert_eq!(content.as_ref(), b"jpeg");
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());

        store.put("b", "k", Bytes::from_static(b"one"), "text/plain").await.unwrap();
        store.put("b", "k", Bytes::from_static(b"two"), "text/plain").await.unwrap();
        assert_eq!(store.get("b", "k").await.unwrap().as_ref(), b"two");
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());

        let err = store.get("images", "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());

        let err = store
            .put("b", "../escape", Bytes::from_static(b"x"), "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, ObjectStoreError::Rejected(_)));
    }

    #[test]
    fn test_connect() {
        assert!(LocalObjectStore::connect("local:./data").is_ok());
        assert!(LocalObjectStore::connect("local:").is_err());
        assert!(LocalObjectStore::connect("s3:").is_err());
    }
}
