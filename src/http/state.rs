use crate::broadcast::Notifier;
use crate::registry::ConnectionRegistry;
use crate::transform::ThumbnailPipeline;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct HttpServerState {
    pub name: Arc<String>,
    pub registry: Arc<dyn ConnectionRegistry>,
    pub thumbnails: Arc<ThumbnailPipeline>,
    pub notifier: Arc<Notifier>,
}
