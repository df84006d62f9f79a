//! Verification service endpoint configuration

use serde::{Deserialize, Serialize};

/// Configuration for reaching the remote verification service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the verification service (no trailing slash required)
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://api.gatekeep.dev"),
            request_timeout: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Create a new configuration pointing at the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout in seconds
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout = seconds;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Reads `GATEKEEP_API_URL` and `GATEKEEP_API_TIMEOUT_SECS`, falling
    /// back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("GATEKEEP_API_URL") {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        if let Ok(timeout) = std::env::var("GATEKEEP_API_TIMEOUT_SECS") {
            if let Ok(seconds) = timeout.parse() {
                config.request_timeout = seconds;
            }
        }
        config
    }

    /// Base URL with any trailing slash removed
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn default_request_timeout() -> u64 {
    30 // 30 seconds
}
