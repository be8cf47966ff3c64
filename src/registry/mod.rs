//! Server registry — the process-wide store of the latest scan snapshot
//! and the currently selected server.
//!
//! All shared mutable state in the discovery subsystem lives here, behind a
//! single lock. Mutations persist the config file after the lock is
//! released; readers always see either the full old snapshot or the full
//! new one.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{self, MonitorConfig};

/// A host discovered by a network scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub ip: String,
    pub hostname: String,
    pub is_local: bool,
}

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("server {0} is not in the current scan results")]
    NotFound(String),
}

/// Result of resolving the current selection against the snapshot.
///
/// `scan_needed` is set when nothing could be resolved at all; the caller
/// decides whether to enqueue a scan — the registry never spawns work.
#[derive(Debug, Clone)]
pub struct Selection {
    pub server: Option<ServerRecord>,
    pub last_error: Option<String>,
    pub scan_needed: bool,
}

struct RegistryState {
    servers: Vec<ServerRecord>,
    selected: Option<String>,
    last_error: Option<String>,
    theme: String,
    refresh_interval: u64,
}

pub struct ServerRegistry {
    state: RwLock<RegistryState>,
    config_path: PathBuf,
}

impl ServerRegistry {
    /// Build the registry from the persisted config loaded at startup.
    pub fn from_config(config: MonitorConfig, config_path: PathBuf) -> Self {
        let selected = if config.last_server.is_empty() {
            None
        } else {
            Some(config.last_server)
        };
        Self {
            state: RwLock::new(RegistryState {
                servers: config.found_servers,
                selected,
                last_error: None,
                theme: config.theme,
                refresh_interval: config.refresh_interval,
            }),
            config_path,
        }
    }

    /// Write the current state back to the config file. Best effort.
    fn persist(&self) {
        let config = {
            let state = self.state.read().unwrap();
            MonitorConfig {
                theme: state.theme.clone(),
                refresh_interval: state.refresh_interval,
                last_server: state.selected.clone().unwrap_or_default(),
                found_servers: state.servers.clone(),
            }
        };
        config::save(&self.config_path, &config);
    }

    /// Current snapshot of discovered servers.
    pub fn list_servers(&self) -> Vec<ServerRecord> {
        self.state.read().unwrap().servers.clone()
    }

    /// Install the result of a completed scan, replacing the previous
    /// snapshot wholesale. The selected address is retained even if the
    /// host vanished — it may reappear on a later scan, and resolution
    /// happens at read time in `current_selection`.
    pub fn replace_snapshot(&self, servers: Vec<ServerRecord>) {
        {
            let mut state = self.state.write().unwrap();
            info!("Scan complete: {} server(s) found", servers.len());
            state.servers = servers;
        }
        self.persist();
    }

    /// Select a server by address. Fails if the address is not in the
    /// current snapshot, leaving the selection unchanged.
    pub fn select(&self, ip: &str) -> Result<ServerRecord, SelectError> {
        let result = {
            let mut state = self.state.write().unwrap();
            match state.servers.iter().find(|s| s.ip == ip).cloned() {
                Some(record) => {
                    state.selected = Some(record.ip.clone());
                    state.last_error = None;
                    Ok(record)
                }
                None => {
                    let err = SelectError::NotFound(ip.to_string());
                    state.last_error = Some(err.to_string());
                    Err(err)
                }
            }
        };
        if let Ok(record) = &result {
            debug!("Selected server {} ({})", record.ip, record.hostname);
            self.persist();
        }
        result
    }

    /// Resolve the selection against the current snapshot.
    ///
    /// Fallback order: the persisted last-selected address if still
    /// present, else the local host record, else nothing — in which case
    /// `scan_needed` asks the caller to enqueue a scan.
    pub fn current_selection(&self) -> Selection {
        let state = self.state.read().unwrap();
        let server = state
            .selected
            .as_deref()
            .and_then(|ip| state.servers.iter().find(|s| s.ip == ip))
            .or_else(|| state.servers.iter().find(|s| s.is_local))
            .cloned();
        Selection {
            scan_needed: server.is_none(),
            last_error: state.last_error.clone(),
            server,
        }
    }

    pub fn theme(&self) -> String {
        self.state.read().unwrap().theme.clone()
    }

    pub fn set_theme(&self, theme: &str) {
        {
            let mut state = self.state.write().unwrap();
            state.theme = theme.to_string();
        }
        self.persist();
    }

    pub fn refresh_interval(&self) -> u64 {
        self.state.read().unwrap().refresh_interval
    }
}
