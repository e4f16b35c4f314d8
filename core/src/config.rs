//! Client configuration: backend base URL, endpoint paths and timeouts.
//!
//! # Environment Variables
//! - `RASEED_API_BASE_URL` - backend root (default: the build-time value of the
//!   same variable, else `http://localhost:8080`)
//! - `RASEED_REQUEST_TIMEOUT_SECS` - timeout for ordinary calls (default: 30)
//! - `RASEED_UPLOAD_TIMEOUT_SECS` - timeout for long-running calls (default: 120)

use std::time::Duration;

use thiserror::Error;

/// Base URL baked in at compile time, overridable at runtime.
pub const DEFAULT_BASE_URL: &str = match option_env!("RASEED_API_BASE_URL") {
    Some(url) => url,
    None => "http://localhost:8080",
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Paths relative to the base URL.
pub mod endpoints {
    pub const HEALTH: &str = "/health";
    pub const SIGN_IN: &str = "/auth/signin";
    pub const SIGN_UP: &str = "/auth/signup";
    pub const WARRANTY_PRODUCTS: &str = "/warranty-reminders/warranty-products";
    pub const UPCOMING_REMINDERS: &str = "/warranty-reminders/upcoming/";
    pub const CREATE_REMINDER: &str = "/warranty-reminders/create-single/";
    pub const CREATE_ALL_REMINDERS: &str = "/warranty-reminders/create-all/";
    pub const WALLET_ELIGIBLE_ITEMS: &str = "/wallet/eligible-items";
    pub const WALLET_USER_PASSES: &str = "/wallet/user-passes";
    pub const WALLET_GENERATE_PASS: &str = "/wallet/generate-pass";
    pub const WALLET_PASS_STATUS: &str = "/wallet/pass-status";
    pub const WALLET_PASS: &str = "/wallet/pass";
    pub const RECEIPTS: &str = "/receipts";
    pub const ANALYTICS: &str = "/analytics";
    pub const CHAT: &str = "/economix/chat";
    pub const DASHBOARD: &str = "/ui/dashboard";
    pub const GRAPHS: &str = "/ui/graphs";
    pub const GRAPH_DETAILS: &str = "/ui/graph";
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: normalize_base_url(DEFAULT_BASE_URL),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// Load from the process environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a timeout variable is not a whole number of
    /// seconds or the base URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with variables resolved through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("RASEED_API_BASE_URL") {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidEnvVar(
                    "RASEED_API_BASE_URL".to_string(),
                    format!("expected an http(s) URL, got {url:?}"),
                ));
            }
            config.base_url = normalize_base_url(&url);
        }
        if let Some(secs) = lookup("RASEED_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = parse_secs("RASEED_REQUEST_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("RASEED_UPLOAD_TIMEOUT_SECS") {
            config.upload_timeout = parse_secs("RASEED_UPLOAD_TIMEOUT_SECS", &secs)?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(key.to_string(), "must be at least 1".to_string())),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}
