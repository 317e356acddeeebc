#![allow(dead_code)]

use pixelpost::broadcast::{Broadcaster, Notifier};
use pixelpost::dispatch::DispatchOptions;
use pixelpost::http::state::HttpServerState;
use pixelpost::registry::ConnectionRegistry;
use pixelpost::registry::memory::MemoryRegistry;
use pixelpost::test_utils::{MemoryObjectStore, ScriptedPushClient, UnavailableRegistry};
use pixelpost::transform::{ThumbnailPipeline, ThumbnailWorker};
use std::sync::Arc;

pub mod http;

pub const SOURCE_BUCKET: &str = "images";
pub const THUMBNAIL_BUCKET: &str = "thumbnails";

/// Every collaborator of the engine, wired with in-memory doubles.
pub struct Harness {
    pub store: Arc<MemoryObjectStore>,
    pub registry: Arc<dyn ConnectionRegistry>,
    pub push: Arc<ScriptedPushClient>,
    pub thumbnails: Arc<ThumbnailPipeline>,
    pub notifier: Arc<Notifier>,
}

impl Harness {
    pub fn new(push: ScriptedPushClient) -> Self {
        Self::with_options(push, DispatchOptions::default())
    }

    pub fn with_options(push: ScriptedPushClient, options: DispatchOptions) -> Self {
        Self::build(push, Arc::new(MemoryRegistry::new()), options)
    }

    /// Harness around a registry that fails every call.
    pub fn with_unavailable_registry(push: ScriptedPushClient) -> Self {
        Self::build(
            push,
            Arc::new(UnavailableRegistry),
            DispatchOptions::default(),
        )
    }

    fn build(
        push: ScriptedPushClient,
        registry: Arc<dyn ConnectionRegistry>,
        options: DispatchOptions,
    ) -> Self {
        let store = Arc::new(MemoryObjectStore::new());
        let push = Arc::new(push);

        let worker = ThumbnailWorker::new(store.clone(), THUMBNAIL_BUCKET);
        let thumbnails = Arc::new(ThumbnailPipeline::new(Arc::new(worker), options.clone()));
        let notifier = Arc::new(Notifier::new(
            registry.clone(),
            Broadcaster::new(push.clone(), options),
        ));

        Self {
            store,
            registry,
            push,
            thumbnails,
            notifier,
        }
    }

    pub fn state(&self) -> HttpServerState {
        HttpServerState {
            name: Arc::new("PixelPost Test".to_string()),
            registry: self.registry.clone(),
            thumbnails: self.thumbnails.clone(),
            notifier: self.notifier.clone(),
        }
    }

    pub async fn registered_ids(&self) -> Vec<String> {
        self.registry
            .scan_all()
            .await
            .expect("memory registry scan cannot fail")
            .into_iter()
            .map(|record| record.id)
            .collect()
    }
}

/// An S3 event notification body for `keys` in `bucket`.
pub fn s3_notification(bucket: &str, keys: &[&str]) -> String {
    let records: Vec<serde_json::Value> = keys
        .iter()
        .map(|key| {
            serde_json::json!({
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": bucket },
                    "object": { "key": key }
                }
            })
        })
        .collect();
    serde_json::json!({ "Records": records }).to_string()
}
