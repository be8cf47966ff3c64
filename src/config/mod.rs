//! Persisted dashboard configuration — theme, refresh interval, and the
//! last scan results with the last selected server.
//!
//! The file is plain JSON, read once at startup and rewritten after every
//! mutating registry operation. A missing or corrupt file is never fatal:
//! `load` falls back to defaults and `save` failures are logged and dropped.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::registry::ServerRecord;

pub const DEFAULT_CONFIG_FILE: &str = "monitor_config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    #[serde(default)]
    pub last_server: String,
    #[serde(default)]
    pub found_servers: Vec<ServerRecord>,
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_refresh_interval() -> u64 {
    5
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            refresh_interval: default_refresh_interval(),
            last_server: String::new(),
            found_servers: Vec::new(),
        }
    }
}

/// Load the config file, falling back to defaults if it is missing or
/// unparseable.
pub fn load(path: &Path) -> MonitorConfig {
    match std::fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(e) => {
                warn!("Config file {} is corrupt ({}), using defaults", path.display(), e);
                MonitorConfig::default()
            }
        },
        Err(_) => MonitorConfig::default(),
    }
}

/// Write the config file. Best effort: a failed save must never fail the
/// operation that triggered it.
pub fn save(path: &Path, config: &MonitorConfig) {
    match serde_json::to_string_pretty(config) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                warn!("Failed to save config to {}: {}", path.display(), e);
            }
        }
        Err(e) => warn!("Failed to serialize config: {}", e),
    }
}
