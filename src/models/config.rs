//! Server configuration
//!
//! All values come from the environment with defaults from
//! `utils/constants.rs`. Railway-style `PORT` wins over `DEAL_PORT`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RATE_LIMIT_PER_MINUTE};

/// Configuration for the API server
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// JSON snapshot of the asset store; `None` keeps assets in memory only
    pub data_path: Option<PathBuf>,
    /// Requests allowed per client per window
    pub rate_limit_requests: u32,
    /// Rate limit window
    pub rate_limit_window: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_path: None,
            rate_limit_requests: DEFAULT_RATE_LIMIT_PER_MINUTE,
            rate_limit_window: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup, so tests need not touch
    /// the process environment
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("DEAL_HOST").filter(|h| !h.is_empty()) {
            config.host = host;
        }

        if let Some((key, raw)) = lookup("PORT")
            .map(|v| ("PORT", v))
            .or_else(|| lookup("DEAL_PORT").map(|v| ("DEAL_PORT", v)))
        {
            config.port = raw
                .trim()
                .parse()
                .map_err(|_| AppError::invalid_config(key, &raw))?;
        }

        if let Some(path) = lookup("DEAL_DATA_PATH").filter(|p| !p.is_empty()) {
            info!(path = %path, "asset snapshot enabled");
            config.data_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup("DEAL_RATE_LIMIT") {
            config.rate_limit_requests = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::invalid_config("DEAL_RATE_LIMIT", &raw))?;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| AppError::invalid_config("DEAL_HOST", &self.host))
    }
}
