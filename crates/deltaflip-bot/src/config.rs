//! Application configuration.
//!
//! Settings come from a TOML file; credentials come only from the
//! environment and are never written to disk.

use crate::error::{AppError, AppResult};
use deltaflip_client::DEFAULT_BASE_URL;
use deltaflip_reconciler::ReconcilerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Webhook listening port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Exchange REST base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for outbound exchange calls (seconds). Bounded so a hung
    /// call cannot hold the in-flight guard indefinitely.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Reconciler configuration.
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

fn default_port() -> u16 {
    4000
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            reconciler: ReconcilerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration, falling back to defaults when no file exists.
    ///
    /// Path resolution: `DELTAFLIP_CONFIG` env var, then
    /// `config/default.toml`.
    pub fn load() -> AppResult<Self> {
        let config_path = std::env::var("DELTAFLIP_CONFIG")
            .unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply environment overrides: `PORT` beats the config file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        self
    }
}

/// Exchange API credentials, environment-sourced.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    /// Read `DELTA_API_KEY` and `DELTA_API_SECRET`.
    pub fn from_env() -> AppResult<Self> {
        let api_key = std::env::var("DELTA_API_KEY")
            .map_err(|_| AppError::Config("DELTA_API_KEY is not set".into()))?;
        let api_secret = std::env::var("DELTA_API_SECRET")
            .map_err(|_| AppError::Config("DELTA_API_SECRET is not set".into()))?;
        Ok(Self {
            api_key,
            api_secret,
        })
    }
}

// Keep the secret out of debug output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}
