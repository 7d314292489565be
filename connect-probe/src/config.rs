//! Configuration module

use std::env;

/// Probe configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Local port for the OAuth redirect listener
    pub callback_port: u16,

    /// Seconds to wait for the browser to hit the callback
    pub callback_timeout_secs: u64,

    /// Timeout for token endpoint calls
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            callback_port: 8080,
            callback_timeout_secs: 120,
            http_timeout_secs: spam_triage_core::constants::DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            callback_port: env::var("OAUTH_CALLBACK_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.callback_port),

            callback_timeout_secs: env::var("OAUTH_CALLBACK_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.callback_timeout_secs),

            http_timeout_secs: defaults.http_timeout_secs,
        }
    }

    /// Redirect URI registered with the connected app
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.callback_port)
    }
}
