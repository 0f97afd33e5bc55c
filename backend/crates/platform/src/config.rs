//! Backend Configuration
//!
//! Connection settings for the hosted backend, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable names
pub const ENV_BACKEND_URL: &str = "GROOP_BACKEND_URL";
pub const ENV_BACKEND_ANON_KEY: &str = "GROOP_BACKEND_ANON_KEY";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "GROOP_REQUEST_TIMEOUT_SECS";
pub const ENV_SESSION_FILE: &str = "GROOP_SESSION_FILE";

/// Error when loading configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Hosted backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyz.example.co`
    pub url: String,
    /// Public (anonymous) API key sent with every request
    pub anon_key: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Where the session is persisted between runs (none = memory only)
    pub session_file: Option<PathBuf>,
}

impl BackendConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            request_timeout: Self::DEFAULT_TIMEOUT,
            session_file: None,
        }
    }

    /// Load from process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (environment, .env map, tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_BACKEND_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_BACKEND_URL))?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: ENV_BACKEND_URL,
                value: url,
            });
        }

        let anon_key = lookup(ENV_BACKEND_ANON_KEY)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_BACKEND_ANON_KEY))?;

        let mut config = Self::new(url, anon_key);

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_REQUEST_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    key: ENV_REQUEST_TIMEOUT_SECS,
                    value: raw,
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        config.session_file = lookup(ENV_SESSION_FILE)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}
