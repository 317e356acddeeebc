use super::ThumbnailWorker;
use crate::aggregate::{TransformReport, collect_transform_results};
use crate::datamodel::UploadEvent;
use crate::dispatch::{DispatchError, DispatchOptions, dispatch};
use std::sync::Arc;

/// Image path of an upload notification: one worker unit per record.
#[derive(Debug)]
pub struct ThumbnailPipeline {
    worker: Arc<ThumbnailWorker>,
    options: DispatchOptions,
}

impl ThumbnailPipeline {
    pub fn new(worker: Arc<ThumbnailWorker>, options: DispatchOptions) -> Self {
        Self { worker, options }
    }

    pub async fn run(&self, events: Vec<UploadEvent>) -> Result<TransformReport, DispatchError> {
        let keys: Vec<String> = events.iter().map(|event| event.key.clone()).collect();
        let completions = dispatch(
            events,
            |event| {
                let worker = self.worker.clone();
                async move { worker.process(event).await }
            },
            &self.options,
        )
        .await?;

        Ok(collect_transform_results(&keys, completions))
    }
}
