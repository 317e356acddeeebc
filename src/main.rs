#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use pixelpost::broadcast::{Broadcaster, HttpPushClient, LoggingPushClient, Notifier, PushClient};
use pixelpost::config::{self, load_configuration};
use pixelpost::http::server::{HttpLimits, run_http_server};
use pixelpost::http::state::HttpServerState;
use pixelpost::object_store::object_store_factory::create_object_store_from_url;
use pixelpost::registry::registry_factory::create_registry_from_connection_string;
use pixelpost::transform::{ThumbnailPipeline, ThumbnailWorker};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, event};

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main())
}

fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    if json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn async_main() -> Result<()> {
    load_configuration().context("Failed to load configuration")?;
    let config = config::get().context("Failed to get configuration")?;

    init_tracing(config.json_logs);
    config.validate().context("Invalid configuration")?;
    if config.batch_deadline_seconds == 0 {
        event!(
            Level::WARN,
            "Batch deadline disabled, slow batches end with an HTTP timeout instead of per-item outcomes"
        );
    }

    // Initialize Sentry if DSN is provided
    let _sentry = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    event!(
        Level::INFO,
        registry = %config.registry_connection_string,
        "Connecting to connection registry"
    );
    let registry = create_registry_from_connection_string(&config.registry_connection_string)
        .await
        .context("Failed to create connection registry")?;
    registry
        .create_or_migrate()
        .await
        .context("Failed to create or migrate connection registry")?;

    let store = create_object_store_from_url(&config.object_store_url)
        .await
        .context("Failed to create object store")?;

    let push: Arc<dyn PushClient> = match &config.push_endpoint {
        Some(endpoint) => Arc::new(
            HttpPushClient::new(endpoint.clone(), config.push_timeout())
                .context("Failed to create push client")?,
        ),
        None => {
            event!(
                Level::WARN,
                "No push endpoint configured, notifications will only be logged"
            );
            Arc::new(LoggingPushClient)
        }
    };

    let options = config.dispatch_options();
    let worker = ThumbnailWorker::new(store, config.thumbnails_bucket.clone())
        .with_suffix(config.derivative_suffix.clone())
        .with_spec(config.thumbnail_spec());
    let thumbnails = ThumbnailPipeline::new(Arc::new(worker), options.clone());
    let notifier = Notifier::new(registry.clone(), Broadcaster::new(push, options));

    let state = HttpServerState {
        name: Arc::new("PixelPost".to_string()),
        registry,
        thumbnails: Arc::new(thumbnails),
        notifier: Arc::new(notifier),
    };
    let limits = HttpLimits {
        body_limit: config.parse_http_body_limit()?,
        timeout: Duration::from_secs(config.http_server_timeout_seconds),
    };
    let address = SocketAddr::from((config.endpoint, config.port));

    match run_http_server(state, address, limits).await {
        Ok(_) => {
            event!(Level::INFO, "HTTP server stopped gracefully");
            Ok(())
        }
        Err(err) => {
            event!(Level::ERROR, "HTTP server failed: {}", err);
            sentry::integrations::anyhow::capture_anyhow(&err);
            Err(err)
        }
    }
}
