use crate::broadcast::{PushClient, PushError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub enum PushBehavior {
    Deliver,
    Gone,
    Fail(String),
    /// Deliver after sleeping.
    Slow(Duration),
}

/// Push client answering per connection id from a script. Ids without a
/// script entry are delivered.
#[derive(Debug, Default)]
pub struct ScriptedPushClient {
    behaviors: HashMap<String, PushBehavior>,
    delivered: Mutex<Vec<(String, Bytes)>>,
}

impl ScriptedPushClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, connection_id: &str, behavior: PushBehavior) -> Self {
        self.behaviors.insert(connection_id.to_string(), behavior);
        self
    }

    /// Messages that were accepted, in arrival order.
    pub async fn delivered(&self) -> Vec<(String, Bytes)> {
        self.delivered.lock().await.clone()
    }
}

#[async_trait]
impl PushClient for ScriptedPushClient {
    async fn post_to_connection(&self, connection_id: &str, body: Bytes) -> Result<(), PushError> {
        let behavior = self
            .behaviors
            .get(connection_id)
            .cloned()
            .unwrap_or(PushBehavior::Deliver);

        match behavior {
            PushBehavior::Deliver => {}
            PushBehavior::Gone => return Err(PushError::Gone(connection_id.to_string())),
            PushBehavior::Fail(reason) => return Err(PushError::Transient(reason)),
            PushBehavior::Slow(delay) => tokio::time::sleep(delay).await,
        }

        self.delivered
            .lock()
            .await
            .push((connection_id.to_string(), body));
        Ok(())
    }
}
