//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const SESSION_DIR_NAME: &str = "yoga-studio";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Parse { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    /// Directory backing session storage.
    pub session_dir: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `STUDIO_API_URL`: default `http://localhost:8080/api`
    /// - `STUDIO_SESSION_DIR`: default `<temp dir>/yoga-studio`
    /// - `STUDIO_REQUEST_TIMEOUT_SECS`: default 30
    /// - `STUDIO_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout variable is set but not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("STUDIO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        let session_dir = std::env::var_os("STUDIO_SESSION_DIR")
            .map_or_else(default_session_dir, PathBuf::from);
        let timeouts = Timeouts {
            request_secs: env_parse_u64("STUDIO_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_u64("STUDIO_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        Ok(Self::new(api_url, session_dir, timeouts))
    }

    #[must_use]
    pub fn new(api_url: impl Into<String>, session_dir: impl Into<PathBuf>, timeouts: Timeouts) -> Self {
        let api_url: String = api_url.into();
        Self { api_url: api_url.trim_end_matches('/').to_owned(), session_dir: session_dir.into(), timeouts }
    }

    /// Apply explicit overrides (e.g. CLI flags) on top of the env config.
    #[must_use]
    pub fn with_overrides(mut self, api_url: Option<String>, session_dir: Option<PathBuf>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url.trim_end_matches('/').to_owned();
        }
        if let Some(dir) = session_dir {
            self.session_dir = dir;
        }
        self
    }
}

fn default_session_dir() -> PathBuf {
    std::env::temp_dir().join(SESSION_DIR_NAME)
}

fn env_parse_u64(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Parse { var, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
