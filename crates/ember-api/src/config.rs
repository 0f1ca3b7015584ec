use std::time::Duration;

/// Default backend address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const DIRECT_PROCESS_PATH: &str = "/api/v1/ws/direct-process";
const CAMERA_PATH: &str = "/api/v1/ws/fire";

/// Configuration for the REST client.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    base_url: String,
    timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Set the backend base URL, e.g. "http://localhost:8000". A trailing
    /// slash is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for a REST path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Streaming endpoint for `path`: the base URL with `http` replaced by `ws`.
    pub fn ws_url(&self, path: &str) -> String {
        let base = match self.base_url.strip_prefix("http") {
            Some(rest) => format!("ws{rest}"),
            None => self.base_url.clone(),
        };
        format!("{base}{path}")
    }

    /// Endpoint that receives uploads and YouTube jobs.
    pub fn direct_process_url(&self) -> String {
        self.ws_url(DIRECT_PROCESS_PATH)
    }

    /// Live camera endpoint.
    pub fn camera_url(&self) -> String {
        self.ws_url(CAMERA_PATH)
    }
}
