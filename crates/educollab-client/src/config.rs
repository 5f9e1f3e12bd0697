//! Client configuration loaded from environment variables.
//!
//! Every setting has a default, so a client starts against a local
//! json-server style backend with no configuration at all.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use educollab_shared::constants::{DATABASE_FILE, DEFAULT_API_URL, SESSION_FILE};
use educollab_store::database::default_data_dir;

use crate::error::{ClientError, Result};

/// Where resource reads and writes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// REST backend at `api_url`.
    Http,
    /// Local SQLite file in the data directory.
    Sqlite,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "rest" => Ok(Backend::Http),
            "sqlite" | "local" => Ok(Backend::Sqlite),
            other => Err(format!("unknown backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend.
    /// Env: `EDUCOLLAB_API_URL`
    /// Default: `http://localhost:3001`
    pub api_url: String,

    /// Env: `EDUCOLLAB_BACKEND` (`http` or `sqlite`)
    /// Default: `http`
    pub backend: Backend,

    /// Directory holding the session file and the local database.
    /// Env: `EDUCOLLAB_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Env: `EDUCOLLAB_REQUEST_TIMEOUT_SECS`
    /// Default: `10`
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            backend: Backend::Http,
            data_dir: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source, falling back to defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = var("EDUCOLLAB_API_URL") {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                config.api_url = url.to_string();
            }
        }

        if let Some(val) = var("EDUCOLLAB_BACKEND") {
            match val.parse() {
                Ok(backend) => config.backend = backend,
                Err(e) => tracing::warn!(value = %val, error = %e, "Invalid EDUCOLLAB_BACKEND, using default"),
            }
        }

        if let Some(dir) = var("EDUCOLLAB_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(val) = var("EDUCOLLAB_REQUEST_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %val, "Invalid EDUCOLLAB_REQUEST_TIMEOUT_SECS, using default"),
            }
        }

        config
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir().map_err(|e| ClientError::SessionStorage(e.to_string())),
        }
    }

    pub fn session_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(SESSION_FILE))
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(DATABASE_FILE))
    }
}
