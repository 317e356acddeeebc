use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

/// HTTP request timeout for a single push.
pub const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum PushError {
    /// The gateway confirmed the connection no longer exists.
    #[error("Connection {0} is gone")]
    Gone(String),

    /// Anything else. The connection may still be alive.
    #[error("Push failed: {0}")]
    Transient(String),
}

#[async_trait]
pub trait PushClient: Send + Sync + Debug {
    async fn post_to_connection(&self, connection_id: &str, body: Bytes) -> Result<(), PushError>;
}

/// Posts to a connection management endpoint laid out as
/// `{endpoint}/@connections/{connection_id}`.
#[derive(Debug, Clone)]
pub struct HttpPushClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPushClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build push HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn connection_url(&self, connection_id: &str) -> String {
        format!(
            "{}/@connections/{}",
            self.endpoint,
            urlencoding::encode(connection_id)
        )
    }
}

/// Map a push endpoint response status onto the push contract.
pub fn classify_status(connection_id: &str, status: StatusCode) -> Result<(), PushError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::GONE {
        Err(PushError::Gone(connection_id.to_string()))
    } else {
        Err(PushError::Transient(format!("HTTP {}", status.as_u16())))
    }
}

#[async_trait]
impl PushClient for HttpPushClient {
    async fn post_to_connection(&self, connection_id: &str, body: Bytes) -> Result<(), PushError> {
        let response = self
            .client
            .post(self.connection_url(connection_id))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| PushError::Transient(err.to_string()))?;
        classify_status(connection_id, response.status())
    }
}

/// Used when no push endpoint is configured: logs the message and reports
/// it as delivered.
#[derive(Debug, Default, Clone)]
pub struct LoggingPushClient;

#[async_trait]
impl PushClient for LoggingPushClient {
    async fn post_to_connection(&self, connection_id: &str, body: Bytes) -> Result<(), PushError> {
        tracing::info!(
            connection_id,
            body = %String::from_utf8_lossy(&body),
            "No push endpoint configured, dropping message"
        );
        Ok(())
    }
}
