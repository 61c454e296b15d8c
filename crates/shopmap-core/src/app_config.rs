use std::net::SocketAddr;
use std::path::PathBuf;

use crate::{ConfigError, Position};

/// Variable holding the mapping-provider credential.
pub const MAPS_API_KEY_VAR: &str = "SHOPMAP_MAPS_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Path or `http(s)` URL of the tabular shop file.
    pub data_source: String,
    pub schema_path: Option<PathBuf>,
    pub maps_api_key: Option<String>,
    pub zoom_threshold: u8,
    pub initial_zoom: u8,
    pub map_center: Position,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

impl AppConfig {
    /// The mapping-provider key, or the actionable configuration error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigurationMissing`] when no key is configured.
    pub fn require_maps_api_key(&self) -> Result<&str, ConfigError> {
        self.maps_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::ConfigurationMissing(MAPS_API_KEY_VAR.to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("data_source", &self.data_source)
            .field("schema_path", &self.schema_path)
            .field(
                "maps_api_key",
                &self.maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("zoom_threshold", &self.zoom_threshold)
            .field("initial_zoom", &self.initial_zoom)
            .field("map_center", &self.map_center)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
