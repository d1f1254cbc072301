//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const SESSION_FILE_NAME: &str = "session.json";

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A URL variable was set but does not start with `http://` or `https://`.
    #[error("invalid URL in {var}: {value}")]
    InvalidUrl { var: &'static str, value: String },

    /// Neither `FOLIO_SESSION_FILE` nor `HOME` is available.
    #[error("cannot locate session file: set FOLIO_SESSION_FILE or HOME")]
    MissingSessionPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL, without trailing slash.
    pub api_url: String,
    /// Public base URL that uploaded media paths are resolved against.
    pub storage_url: String,
    /// Location of the persisted session document.
    pub session_file: PathBuf,
    pub timeouts: Timeouts,
}

impl Config {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `FOLIO_API_URL`: default `http://localhost:8000`
    /// - `FOLIO_STORAGE_URL`: default `<api url>/storage`
    /// - `FOLIO_SESSION_FILE`: default `$HOME/.folio/session.json`
    /// - `FOLIO_REQUEST_TIMEOUT_SECS`: default 30
    /// - `FOLIO_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a URL is malformed or no session path can be derived.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = parse_url("FOLIO_API_URL", std::env::var("FOLIO_API_URL").ok().as_deref())?
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let storage_url = parse_url("FOLIO_STORAGE_URL", std::env::var("FOLIO_STORAGE_URL").ok().as_deref())?
            .unwrap_or_else(|| format!("{api_url}/storage"));

        let session_file = match std::env::var("FOLIO_SESSION_FILE").ok().filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_session_file(std::env::var("HOME").ok().as_deref())?,
        };

        let timeouts = Timeouts {
            request_secs: env_parse_u64("FOLIO_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("FOLIO_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_url, storage_url, session_file, timeouts })
    }

    /// Config pointing at `api_url` with defaults for everything else.
    #[must_use]
    pub fn with_api_url(api_url: &str, session_file: PathBuf) -> Self {
        let api_url = api_url.trim_end_matches('/').to_owned();
        Self { storage_url: format!("{api_url}/storage"), api_url, session_file, timeouts: Timeouts::default() }
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn parse_url(var: &'static str, raw: Option<&str>) -> Result<Option<String>, ConfigError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl { var, value: raw.to_owned() });
    }
    Ok(Some(raw.trim_end_matches('/').to_owned()))
}

fn default_session_file(home: Option<&str>) -> Result<PathBuf, ConfigError> {
    let home = home.filter(|h| !h.is_empty()).ok_or(ConfigError::MissingSessionPath)?;
    Ok(PathBuf::from(home).join(".folio").join(SESSION_FILE_NAME))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
