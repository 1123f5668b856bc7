/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Does not apply
    /// to the SSE progress stream, which has its own poll bound.
    pub request_timeout_secs: u64,
    /// Base URL of the external generation pipeline service.
    pub pipeline_url: String,
    /// Shared secret for webhook HMAC signatures. When unset, inbound
    /// webhook signatures are not verified (local development).
    pub webhook_secret: Option<String>,
    /// Interval between progress-stream store polls in milliseconds
    /// (default: `1000`).
    pub stream_poll_interval_ms: u64,
    /// Hard backstop: maximum polls before a stream times out
    /// (default: `600`, i.e. 10 minutes at 1 Hz).
    pub stream_max_polls: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `PIPELINE_URL`            | `http://localhost:8090`    |
    /// | `PIPELINE_WEBHOOK_SECRET` | unset (no verification)    |
    /// | `STREAM_POLL_INTERVAL_MS` | `1000`                     |
    /// | `STREAM_MAX_POLLS`        | `600`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let pipeline_url =
            std::env::var("PIPELINE_URL").unwrap_or_else(|_| "http://localhost:8090".into());

        let webhook_secret = std::env::var("PIPELINE_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let stream_poll_interval_ms: u64 = std::env::var("STREAM_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("STREAM_POLL_INTERVAL_MS must be a valid u64");

        let stream_max_polls: u32 = std::env::var("STREAM_MAX_POLLS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("STREAM_MAX_POLLS must be a valid u32");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            pipeline_url,
            webhook_secret,
            stream_poll_interval_ms,
            stream_max_polls,
        }
    }
}
