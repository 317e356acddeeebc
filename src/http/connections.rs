//! Connect and disconnect triggers from the push gateway.

use super::app_error::AppError;
use super::state::HttpServerState;
use crate::datamodel::ConnectionRecord;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn connect(
    State(state): State<HttpServerState>,
    Path(connection_id): Path<String>,
) -> Result<Json<ConnectionRecord>, AppError> {
    if connection_id.trim().is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Connection id must not be empty"
        )));
    }
    let record = ConnectionRecord::new(connection_id);
    state
        .registry
        .insert(&record)
        .await
        .map_err(|err| AppError::ServiceUnavailable(err.into()))?;
    tracing::info!(connection_id = %record.id, "Connection registered");
    Ok(Json(record))
}

/// Always 204: disconnecting an unknown id is not an error.
pub async fn disconnect(
    State(state): State<HttpServerState>,
    Path(connection_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let existed = state
        .registry
        .remove(&connection_id)
        .await
        .map_err(|err| AppError::ServiceUnavailable(err.into()))?;
    tracing::info!(connection_id = %connection_id, existed, "Connection removed");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_connections(
    State(state): State<HttpServerState>,
) -> Result<Json<Vec<ConnectionRecord>>, AppError> {
    let connections = state
        .registry
        .scan_all()
        .await
        .map_err(|err| AppError::ServiceUnavailable(err.into()))?;
    Ok(Json(connections))
}
