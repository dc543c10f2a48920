//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Chirp API, including any path prefix
    pub api_url: String,
    /// Path to the database file holding the persisted token
    pub database_path: PathBuf,
    /// Per-request timeout; `None` leaves it to the transport
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            database_path: data_dir.join("chirp.db"),
            request_timeout: None,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Chirp"))
            .unwrap_or_else(|| PathBuf::from(".chirp"))
    }

    /// Defaults overridden by `CHIRP_API_URL`, `CHIRP_DATABASE_PATH` and
    /// `CHIRP_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("CHIRP_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }
        if let Some(path) = lookup("CHIRP_DATABASE_PATH").filter(|v| !v.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("CHIRP_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                CoreError::Config(format!("CHIRP_REQUEST_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api_url)
            .map_err(|e| CoreError::Config(format!("invalid api_url {}: {e}", self.api_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::Config(format!(
                "api_url must be http or https: {}",
                self.api_url
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Simple dirs implementation for common directories
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
