use super::{PushClient, PushError};
use crate::datamodel::{BroadcastOutcome, ConnectionRecord, NotificationPayload};
use crate::dispatch::{DispatchError, DispatchOptions, dispatch};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum BroadcastError {
    #[error("Failed to serialize payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Pushes one payload to many connections, one dispatch unit each.
///
/// The broadcaster only reports liveness. Acting on dead connections is
/// left to the caller.
#[derive(Debug)]
pub struct Broadcaster {
    push: Arc<dyn PushClient>,
    options: DispatchOptions,
}

impl Broadcaster {
    pub fn new(push: Arc<dyn PushClient>, options: DispatchOptions) -> Self {
        Self { push, options }
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Outcomes come back in the order of `connections`.
    pub async fn broadcast(
        &self,
        payload: &NotificationPayload,
        connections: Vec<ConnectionRecord>,
    ) -> Result<Vec<BroadcastOutcome>, BroadcastError> {
        self.broadcast_with(payload, connections, &self.options).await
    }

    /// Same as [`Broadcaster::broadcast`] with dispatch options overridden,
    /// typically a deadline shortened to what is left of a batch budget.
    pub async fn broadcast_with(
        &self,
        payload: &NotificationPayload,
        connections: Vec<ConnectionRecord>,
        options: &DispatchOptions,
    ) -> Result<Vec<BroadcastOutcome>, BroadcastError> {
        let body = Bytes::from(payload.to_json_bytes()?);
        let ids: Vec<String> = connections.into_iter().map(|c| c.id).collect();

        let mut completions = dispatch(
            ids.clone(),
            |connection_id| {
                let push = self.push.clone();
                let body = body.clone();
                async move { push_to_connection(push.as_ref(), connection_id, body).await }
            },
            options,
        )
        .await?;
        completions.sort_by_key(|completion| completion.index);

        Ok(completions
            .into_iter()
            .map(|completion| match completion.result {
                Ok(outcome) => outcome,
                Err(failure) => {
                    let id = &ids[completion.index];
                    warn!(connection_id = %id, error = %failure, "Push unit did not report");
                    BroadcastOutcome::transient(id.clone(), failure.to_string())
                }
            })
            .collect())
    }
}

async fn push_to_connection(
    push: &dyn PushClient,
    connection_id: String,
    body: Bytes,
) -> BroadcastOutcome {
    match push.post_to_connection(&connection_id, body).await {
        Ok(()) => {
            debug!(connection_id = %connection_id, "Notification delivered");
            BroadcastOutcome::delivered(connection_id)
        }
        Err(PushError::Gone(_)) => {
            debug!(connection_id = %connection_id, "Stale connection");
            BroadcastOutcome::gone(connection_id)
        }
        Err(PushError::Transient(reason)) => {
            warn!(connection_id = %connection_id, error = %reason, "Notification push failed");
            BroadcastOutcome::transient(connection_id, reason)
        }
    }
}
