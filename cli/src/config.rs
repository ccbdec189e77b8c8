use std::time::Duration;

use adapters::upstream::DEFAULT_FAILURE_MARKER;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL of the simulation backend; `/orderbook` is appended.
    pub upstream_url: String,

    /// Hard timeout for one orderbook request.
    ///
    /// Full-curve simulations can take tens of seconds on the backend,
    /// so this is deliberately generous.
    pub request_timeout: Duration,

    /// Delay between two refreshes in `watch` mode.
    ///
    /// The feed never overlaps requests: a slow fetch delays the next one
    /// instead of stacking up.
    pub refresh_every: Duration,

    /// Substring that marks a failed response even under HTTP 200.
    ///
    /// Matched against the compact re-serialization of the body.
    pub failure_marker: String,

    /// JSON logs instead of human-readable ones.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let upstream_url = std::env::var("DEPTHBOOK_UPSTREAM_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:42042/api".to_string());

        let failure_marker = std::env::var("DEPTHBOOK_FAILURE_MARKER")
            .unwrap_or_else(|_| DEFAULT_FAILURE_MARKER.to_string());

        Self {
            upstream_url,
            request_timeout: Duration::from_secs(env_u64("DEPTHBOOK_TIMEOUT_SECS", 60)),
            refresh_every: Duration::from_secs(env_u64("DEPTHBOOK_REFRESH_SECS", 15).max(1)),
            failure_marker,
            json_logs: std::env::var("APP_ENV").unwrap_or_default() == "production",
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
