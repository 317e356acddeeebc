use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live push endpoint known to the registry.
///
/// The id is assigned by the push gateway when the client connects and is
/// stored as-is. It is never regenerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: String,
    #[serde(rename = "establishedAt")]
    pub established_at: DateTime<Utc>,
}

impl ConnectionRecord {
    /// Record for a connection established right now.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_timestamp(id, Utc::now())
    }

    pub fn with_timestamp(id: impl Into<String>, established_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            established_at,
        }
    }
}
