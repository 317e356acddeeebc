use super::resize::{ThumbnailSpec, make_thumbnail};
use crate::datamodel::{FailureKind, TransformResult, TransformStage, UploadEvent};
use crate::object_store::{ObjectStore, ObjectStoreError};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_DERIVATIVE_SUFFIX: &str = ".jpeg";

/// Turns one uploaded image into its thumbnail.
///
/// Every failure is returned as a `TransformResult` naming the stage that
/// failed. The worker never retries: rerunning it on the same key simply
/// overwrites the derivative.
#[derive(Debug)]
pub struct ThumbnailWorker {
    store: Arc<dyn ObjectStore>,
    destination_bucket: String,
    derivative_suffix: String,
    spec: ThumbnailSpec,
}

impl ThumbnailWorker {
    pub fn new(store: Arc<dyn ObjectStore>, destination_bucket: impl Into<String>) -> Self {
        Self {
            store,
            destination_bucket: destination_bucket.into(),
            derivative_suffix: DEFAULT_DERIVATIVE_SUFFIX.to_string(),
            spec: ThumbnailSpec::default(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.derivative_suffix = suffix.into();
        self
    }

    pub fn with_spec(mut self, spec: ThumbnailSpec) -> Self {
        self.spec = spec;
        self
    }

    pub fn destination_bucket(&self) -> &str {
        &self.destination_bucket
    }

    pub fn derivative_key(&self, key: &str) -> String {
        format!("{}{}", key, self.derivative_suffix)
    }

    pub async fn process(&self, event: UploadEvent) -> TransformResult {
        let UploadEvent { bucket, key } = event;
        debug!(bucket = %bucket, key = %key, "Processing uploaded image");

        let source = match self.store.get(&bucket, &key).await {
            Ok(source) => source,
            Err(err) => return store_failure(key, TransformStage::Fetch, err),
        };

        let spec = self.spec;
        let thumbnail =
            match tokio::task::spawn_blocking(move || make_thumbnail(&source, &spec)).await {
                Ok(Ok(thumbnail)) => thumbnail,
                Ok(Err(err)) => {
                    warn!(
                        key = %key,
                        stage = %err.stage(),
                        error = %err,
                        "Thumbnail generation failed"
                    );
                    return TransformResult::failure(
                        key,
                        Some(err.stage()),
                        FailureKind::Data,
                        err.to_string(),
                    );
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "Thumbnail task did not complete");
                    return TransformResult::failure(
                        key,
                        Some(TransformStage::Resize),
                        FailureKind::Internal,
                        err.to_string(),
                    );
                }
            };

        let derivative_key = self.derivative_key(&key);
        if let Err(err) = self
            .store
            .put(
                &self.destination_bucket,
                &derivative_key,
                Bytes::from(thumbnail.jpeg),
                "image/jpeg",
            )
            .await
        {
            return store_failure(key, TransformStage::Write, err);
        }

        info!(
            key = %key,
            bucket = %self.destination_bucket,
            derivative_key = %derivative_key,
            width = thumbnail.width,
            height = thumbnail.height,
            "Thumbnail written"
        );
        TransformResult::success(key, derivative_key, thumbnail.width, thumbnail.height)
    }
}

fn store_failure(key: String, stage: TransformStage, err: ObjectStoreError) -> TransformResult {
    let kind = match err {
        ObjectStoreError::NotFound { .. } | ObjectStoreError::Rejected(_) => FailureKind::Data,
        ObjectStoreError::Transient(_) | ObjectStoreError::Configuration(_) => {
            FailureKind::TransientIo
        }
    };
    warn!(key = %key, stage = %stage, error = %err, "Object store request failed");
    TransformResult::failure(key, Some(stage), kind, err.to_string())
}
