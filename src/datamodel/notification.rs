use serde::{Deserialize, Serialize};

/// Body pushed to every live connection when an image lands.
///
/// Immutable once built; one instance is shared by all units of a
/// broadcast cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(rename = "imageId")]
    image_id: String,
}

impl NotificationPayload {
    pub fn new(image_id: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
        }
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Result of pushing one payload to one connection.
///
/// `dead_connection` is true only when the push target confirmed the
/// endpoint is permanently gone. Transient failures leave it false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastOutcome {
    #[serde(rename = "connectionId")]
    pub connection_id: String,
    pub delivered: bool,
    #[serde(rename = "deadConnection")]
    pub dead_connection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BroadcastOutcome {
    pub fn delivered(connection_id: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
            delivered: true,
            dead_connection: false,
            error: None,
        }
    }

    pub fn gone(connection_id: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
            delivered: false,
            dead_connection: true,
            error: None,
        }
    }

    pub fn transient(connection_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
            delivered: false,
            dead_connection: false,
            error: Some(reason.into()),
        }
    }
}
