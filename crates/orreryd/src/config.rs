//! Configuration for orreryd.
//!
//! Loads settings from /etc/orrery/config.toml or uses defaults. The path
//! can be overridden with the ORRERYD_CONFIG environment variable.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/orrery/config.toml";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upstream feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// ISS position endpoint
    #[serde(default = "default_iss_url")]
    pub iss_url: String,

    /// JWST archive base URL
    #[serde(default = "default_jwst_url")]
    pub jwst_url: String,

    /// JWST archive API key (sent as X-API-KEY)
    #[serde(default)]
    pub jwst_api_key: String,

    /// Astronomical events endpoint
    #[serde(default = "default_astro_events_url")]
    pub astro_events_url: String,

    /// Astronomy API application id (basic auth user)
    #[serde(default)]
    pub astro_app_id: String,

    /// Astronomy API application secret (basic auth password)
    #[serde(default)]
    pub astro_app_secret: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// ISS position refresh interval in seconds
    #[serde(default = "default_iss_sync_interval")]
    pub iss_sync_interval_secs: u64,
}

fn default_iss_url() -> String {
    "https://api.wheretheiss.at/v1/satellites/25544".to_string()
}

fn default_jwst_url() -> String {
    "https://api.jwstapi.com".to_string()
}

fn default_astro_events_url() -> String {
    "https://api.astronomyapi.com/api/v2/bodies/events/sun".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_iss_sync_interval() -> u64 {
    15
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            iss_url: default_iss_url(),
            jwst_url: default_jwst_url(),
            jwst_api_key: String::new(),
            astro_events_url: default_astro_events_url(),
            astro_app_id: String::new(),
            astro_app_secret: String::new(),
            request_timeout_secs: default_request_timeout(),
            iss_sync_interval_secs: default_iss_sync_interval(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "/var/lib/orrery/orrery.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load config from the override path or the default location, falling
    /// back to defaults when no file is readable.
    pub fn load() -> Self {
        let path =
            std::env::var("ORRERYD_CONFIG").unwrap_or_else(|_| CONFIG_PATH.to_string());
        Self::load_from_path(&path).unwrap_or_else(|e| {
            warn!("Config not found, using defaults: {}", e);
            Config::default()
        })
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path);
        Ok(config)
    }

    /// Address to bind the HTTP server to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
