//! Upload notification intake.
//!
//! Handlers answer 200 as long as the batch was dispatched, with one entry
//! per record. Per-record failures live in the body, not in the status,
//! including a registry that cannot be read on the notification path.

use super::app_error::AppError;
use super::state::HttpServerState;
use crate::aggregate::{BroadcastReport, TransformReport};
use crate::datamodel::UploadEvent;
use crate::parsing::parse_upload_notification;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub transforms: TransformReport,
    pub notifications: Vec<BroadcastReport>,
}

fn parse_body(body: &Bytes) -> Result<Vec<UploadEvent>, AppError> {
    let events =
        parse_upload_notification(body).map_err(|err| AppError::BadRequest(err.into()))?;
    tracing::info!(records = events.len(), "Upload notification received");
    Ok(events)
}

/// Both paths of an upload notification, run side by side.
pub async fn handle_upload_notification(
    State(state): State<HttpServerState>,
    body: Bytes,
) -> Result<Json<UploadReport>, AppError> {
    let events = parse_body(&body)?;

    let (transforms, notifications) = tokio::join!(
        state.thumbnails.run(events.clone()),
        state.notifier.notify_batch(&events)
    );

    Ok(Json(UploadReport {
        transforms: transforms?,
        notifications,
    }))
}

pub async fn handle_thumbnails(
    State(state): State<HttpServerState>,
    body: Bytes,
) -> Result<Json<TransformReport>, AppError> {
    let events = parse_body(&body)?;
    Ok(Json(state.thumbnails.run(events).await?))
}

pub async fn handle_notifications(
    State(state): State<HttpServerState>,
    body: Bytes,
) -> Result<Json<Vec<BroadcastReport>>, AppError> {
    let events = parse_body(&body)?;
    Ok(Json(state.notifier.notify_batch(&events).await))
}
