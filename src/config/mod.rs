use anyhow::Error;
use confique::Config;
use std::{
    net::IpAddr,
    sync::{Arc, OnceLock},
    time::Duration,
};

use crate::dispatch::DispatchOptions;
use crate::transform::ThumbnailSpec;

#[derive(Debug, Config)]
pub struct PixelPostConfig {
    #[config(env = "PIXELPOST_PORT", default = 3000)]
    pub port: u16,
    #[config(env = "PIXELPOST_ENDPOINT", default = "127.0.0.1")]
    pub endpoint: IpAddr,

    #[config(env = "PIXELPOST_HTTP_BODY_LIMIT", default = "10mb")]
    pub http_body_limit: String,

    #[config(env = "PIXELPOST_HTTP_SERVER_TIMEOUT_SECONDS", default = 30)]
    pub http_server_timeout_seconds: u64,

    #[config(env = "PIXELPOST_JSON_LOGS", default = false)]
    pub json_logs: bool,

    #[config(
        env = "PIXELPOST_REGISTRY_CONNECTION_STRING",
        default = "sqlite://pixelpost.db"
    )]
    pub registry_connection_string: String,

    #[config(env = "PIXELPOST_OBJECT_STORE_URL", default = "local:./data")]
    pub object_store_url: String,

    #[config(env = "PIXELPOST_THUMBNAILS_BUCKET", default = "thumbnails")]
    pub thumbnails_bucket: String,

    #[config(env = "PIXELPOST_DERIVATIVE_SUFFIX", default = ".jpeg")]
    pub derivative_suffix: String,

    #[config(env = "PIXELPOST_THUMBNAIL_WIDTH", default = 150)]
    pub thumbnail_width: u32,

    #[config(env = "PIXELPOST_JPEG_QUALITY", default = 85)]
    pub jpeg_quality: u8,

    /// Base URL of the connection management API. Without it pushes are
    /// only logged.
    #[config(env = "PIXELPOST_PUSH_ENDPOINT")]
    pub push_endpoint: Option<String>,

    #[config(env = "PIXELPOST_PUSH_TIMEOUT_SECONDS", default = 10)]
    pub push_timeout_seconds: u64,

    /// 0 disables the batch deadline. Must stay below the HTTP server
    /// timeout so per-item timeouts reach the caller.
    #[config(env = "PIXELPOST_BATCH_DEADLINE_SECONDS", default = 25)]
    pub batch_deadline_seconds: u64,

    #[config(env = "PIXELPOST_MAX_CONCURRENT_UNITS")]
    pub max_concurrent_units: Option<usize>,

    #[config(env = "PIXELPOST_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

impl PixelPostConfig {
    pub fn load() -> Result<PixelPostConfig, Error> {
        let c = PixelPostConfig::builder()
            .env()
            .file("settings.toml")
            .load()?;

        Ok(c)
    }

    /// Cross-field checks that confique cannot express.
    pub fn validate(&self) -> Result<(), Error> {
        if self.batch_deadline_seconds > 0
            && self.batch_deadline_seconds >= self.http_server_timeout_seconds
        {
            anyhow::bail!(
                "batch_deadline_seconds ({}) must be lower than http_server_timeout_seconds ({})",
                self.batch_deadline_seconds,
                self.http_server_timeout_seconds
            );
        }
        Ok(())
    }

    pub fn parse_http_body_limit(&self) -> Result<usize, Error> {
        let size = byte_unit::Byte::parse_str(self.http_body_limit.clone(), true)?.as_u64();
        if size > 1024 * 1024 * 1024 {
            anyhow::bail!("Body size is too big: > 1GB");
        }
        Ok(size as usize)
    }

    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            deadline: (self.batch_deadline_seconds > 0)
                .then(|| Duration::from_secs(self.batch_deadline_seconds)),
            max_concurrency: self.max_concurrent_units,
        }
    }

    pub fn thumbnail_spec(&self) -> ThumbnailSpec {
        ThumbnailSpec {
            width: self.thumbnail_width,
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
        }
    }

    pub fn push_timeout(&self) -> Duration {
        Duration::from_secs(self.push_timeout_seconds)
    }
}

static PIXELPOST_CONFIG: OnceLock<Arc<PixelPostConfig>> = OnceLock::new();

pub fn get() -> Result<Arc<PixelPostConfig>, Error> {
    PIXELPOST_CONFIG.get().cloned().ok_or_else(|| {
        Error::msg(
            "Configuration not loaded. Please call load_configuration() before using the configuration",
        )
    })
}

pub fn load_configuration() -> Result<(), Error> {
    // Check if the configuration has already been loaded
    if PIXELPOST_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = PixelPostConfig::load()?;
    PIXELPOST_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}
