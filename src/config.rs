//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TOKEN_KEY: &str = "token";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Auth server origin without a trailing slash.
    pub base_url: String,
    /// Storage key the raw token is written under.
    pub token_key: String,
    /// Directory for the token store; platform data dir when `None`.
    pub state_dir: Option<PathBuf>,
    pub timeouts: AuthTimeouts,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            token_key: DEFAULT_TOKEN_KEY.to_owned(),
            state_dir: None,
            timeouts: AuthTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

impl AuthConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `AUTH_BASE_URL`: default `http://localhost:8000`
    /// - `AUTH_TOKEN_KEY`: default `token`
    /// - `AUTH_STATE_DIR`: default platform data directory
    /// - `AUTH_REQUEST_TIMEOUT_SECS`: default 30
    /// - `AUTH_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] when the base URL or token key is set but blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(
            &std::env::var("AUTH_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
        )?;
        let token_key = std::env::var("AUTH_TOKEN_KEY").unwrap_or_else(|_| DEFAULT_TOKEN_KEY.to_owned());
        if token_key.trim().is_empty() {
            return Err(ConfigError::Empty { var: "AUTH_TOKEN_KEY" });
        }
        let state_dir = std::env::var_os("AUTH_STATE_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let timeouts = AuthTimeouts {
            request_secs: env_parse_u64("AUTH_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("AUTH_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url, token_key, state_dir, timeouts })
    }
}

/// Trim whitespace and trailing slashes so paths can be appended directly.
///
/// # Errors
///
/// Returns [`ConfigError::Empty`] when nothing remains.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Empty { var: "AUTH_BASE_URL" });
    }
    Ok(trimmed.to_owned())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
