//! Client configuration, read from the environment with local defaults.

use std::path::PathBuf;
use std::time::Duration;

use jobboard_observability::{LogFormat, UnknownLogFormat};
use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

pub const ENV_API_URL: &str = "JOBBOARD_API_URL";
pub const ENV_SESSION_FILE: &str = "JOBBOARD_SESSION_FILE";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "JOBBOARD_HTTP_TIMEOUT_SECS";
pub const ENV_LOG_FORMAT: &str = "JOBBOARD_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API url '{0}'")]
    InvalidUrl(String),

    #[error("invalid HTTP timeout '{0}' (expected whole seconds)")]
    InvalidTimeout(String),

    #[error(transparent)]
    LogFormat(#[from] UnknownLogFormat),

    #[error("no data directory available for the session file; set JOBBOARD_SESSION_FILE")]
    NoDataDir,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_url: Url,
    session_file: Option<PathBuf>,
    http_timeout: Option<Duration>,
    log_format: LogFormat,
}

impl ClientConfig {
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        let trimmed = api_url.trim().trim_end_matches('/');
        let api_url = Url::parse(trimmed)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
            .ok_or_else(|| ConfigError::InvalidUrl(api_url.to_string()))?;

        Ok(Self {
            api_url,
            session_file: None,
            http_timeout: None,
            log_format: LogFormat::default(),
        })
    }

    /// Read `JOBBOARD_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::new(&var(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()))?;

        if let Some(path) = var(ENV_SESSION_FILE) {
            config.session_file = Some(PathBuf::from(path));
        }
        if let Some(raw) = var(ENV_HTTP_TIMEOUT_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            if secs == 0 {
                return Err(ConfigError::InvalidTimeout(raw));
            }
            config.http_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(raw) = var(ENV_LOG_FORMAT) {
            config.log_format = raw.parse()?;
        }

        Ok(config)
    }

    /// Replace the API base URL, keeping every other setting.
    pub fn with_api_url(self, api_url: &str) -> Result<Self, ConfigError> {
        let ClientConfig { api_url: parsed, .. } = Self::new(api_url)?;
        Ok(Self {
            api_url: parsed,
            ..self
        })
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_str().trim_end_matches('/')
    }

    /// Absolute URL of an endpoint path such as `/jobs/42`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url(), path.trim_start_matches('/'))
    }

    /// Scheme, host and port of the backend; uploaded files are served from here.
    pub fn api_origin(&self) -> String {
        self.api_url.origin().ascii_serialization()
    }

    /// Timeout for resource calls. Sign-in requests never time out.
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Where the session is persisted: the configured file, or
    /// `<data dir>/jobboard/session.json`.
    pub fn session_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.session_file {
            return Ok(path.clone());
        }

        let base = dirs::data_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut h| {
                    h.push(".local");
                    h.push("share");
                    h
                })
            })
            .ok_or(ConfigError::NoDataDir)?;

        Ok(base.join("jobboard").join("session.json"))
    }
}
