use super::app_error::AppError;
use super::connections::{connect, disconnect, list_connections};
use super::events::{handle_notifications, handle_thumbnails, handle_upload_notification};
use super::health::{liveness, readiness};
use super::state::HttpServerState;
use anyhow::Result;
use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::http::header;
use axum::routing::{get, post, put};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace;
use tower_http::{ServiceBuilderExt, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::Level;

#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    pub body_limit: usize,
    pub timeout: Duration,
}

/// Routes without the middleware stack.
pub fn build_router(state: HttpServerState, body_limit: usize) -> Router {
    let max_body_layer = DefaultBodyLimit::max(body_limit);

    Router::new()
        .route("/", get(handler))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route(
            "/events/s3",
            post(handle_upload_notification).layer(max_body_layer.clone()),
        )
        .route(
            "/events/thumbnails",
            post(handle_thumbnails).layer(max_body_layer.clone()),
        )
        .route(
            "/events/notifications",
            post(handle_notifications).layer(max_body_layer),
        )
        .route("/connections", get(list_connections))
        .route("/connections/{connection_id}", put(connect).delete(disconnect))
        .with_state(state)
}

pub async fn run_http_server(
    state: HttpServerState,
    address: SocketAddr,
    limits: HttpLimits,
) -> Result<()> {
    // List of headers that shouldn't be logged
    let sensitive_headers: Arc<[_]> = vec![header::AUTHORIZATION, header::COOKIE].into();

    // Middleware creation
    let middleware = ServiceBuilder::new()
        .sensitive_request_headers(sensitive_headers.clone())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .sensitive_response_headers(sensitive_headers)
        .layer(TimeoutLayer::new(limits.timeout))
        .compression()
        .into_inner();

    let app = build_router(state, limits.body_limit).layer(middleware);

    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!(%address, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    // Wait for the CTRL+C signal
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install shutdown CTRL+C signal handler");
}

async fn handler(State(state): State<HttpServerState>) -> Result<Json<String>, AppError> {
    let name: String = (*state.name).clone();
    Ok(Json(name))
}
