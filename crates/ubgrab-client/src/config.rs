//! Client configuration: where the backend lives and how long to wait.

use std::time::Duration;

/// Base URL used when none is configured. Matches the backend's
/// development server (`uvicorn` on port 8000) and its `/api/v1` prefix.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/v1";

/// Configuration for [`HttpBackend`](crate::HttpBackend).
///
/// Login and the seed utilities get a longer timeout than plain reads:
/// password hashing and bulk inserts are slow on the dev server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `http://192.168.0.14:8000/api/v1`. A trailing slash
    /// is ignored.
    pub base_url: String,

    /// Timeout for `POST /auth/login`.
    pub login_timeout: Duration,

    /// Timeout for `/seed/fill` and `/seed/clear`.
    pub seed_timeout: Duration,

    /// Timeout for every other request.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_timeout: Duration::from_secs(15),
            seed_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Default timeouts against the given API root.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Joins `path` onto the base URL with exactly one `/` between them.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
