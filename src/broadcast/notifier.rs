use super::{BroadcastError, Broadcaster};
use crate::aggregate::{BroadcastReport, prune_dead_connections};
use crate::datamodel::{NotificationPayload, UploadEvent};
use crate::registry::{ConnectionRegistry, RegistryError};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to read connection registry: {0}")]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    #[error("timeout")]
    DeadlineExceeded,
}

/// Notification path of an upload notification.
///
/// For each uploaded object: snapshot the registry, push the object key to
/// every connection, then prune the connections found gone.
#[derive(Debug)]
pub struct Notifier {
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Broadcaster,
}

impl Notifier {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, broadcaster: Broadcaster) -> Self {
        Self {
            registry,
            broadcaster,
        }
    }

    pub async fn notify_upload(&self, event: &UploadEvent) -> Result<BroadcastReport, NotifyError> {
        self.notify_before(event, self.batch_deadline()).await
    }

    /// Records are handled one after another, each with a fresh snapshot,
    /// all under one batch deadline. Always yields one report per record: a
    /// record that could not be broadcast gets a report carrying the error.
    pub async fn notify_batch(&self, events: &[UploadEvent]) -> Vec<BroadcastReport> {
        let deadline = self.batch_deadline();
        let mut reports = Vec::with_capacity(events.len());
        for event in events {
            let report = match self.notify_before(event, deadline).await {
                Ok(report) => report,
                Err(err) => BroadcastReport::failed(event.key.clone(), err.to_string()),
            };
            reports.push(report);
        }
        reports
    }

    fn batch_deadline(&self) -> Option<Instant> {
        self.broadcaster
            .options()
            .deadline
            .map(|budget| Instant::now() + budget)
    }

    async fn notify_before(
        &self,
        event: &UploadEvent,
        deadline: Option<Instant>,
    ) -> Result<BroadcastReport, NotifyError> {
        let mut options = self.broadcaster.options().clone();
        let connections = match deadline {
            Some(at) => {
                let remaining = at.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(NotifyError::DeadlineExceeded);
                }
                options.deadline = Some(remaining);
                tokio::time::timeout_at(at, self.registry.scan_all())
                    .await
                    .map_err(|_| NotifyError::DeadlineExceeded)??
            }
            None => self.registry.scan_all().await?,
        };
        let payload = NotificationPayload::new(event.key.clone());

        let outcomes = self
            .broadcaster
            .broadcast_with(&payload, connections, &options)
            .await?;
        let pruned = prune_dead_connections(self.registry.as_ref(), &outcomes).await;

        Ok(BroadcastReport::new(payload.image_id(), outcomes, pruned))
    }
}
