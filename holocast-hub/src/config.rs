//! Configuration for the hub.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Network settings.
    pub network: NetworkConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address both listeners bind to.
    pub bind_addr: String,
    /// TCP port for control-plane connections.
    pub control_port: u16,
    /// TCP port for data-plane tunnel connections.
    pub tunnel_port: u16,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            control_port: 7400,
            tunnel_port: 7401,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl HubConfig {
    /// Load from `path`, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("warning: ignoring malformed config {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Address string for the control listener.
    pub fn control_addr(&self) -> String {
        format!("{}:{}", self.network.bind_addr, self.network.control_port)
    }

    /// Address string for the tunnel listener.
    pub fn tunnel_addr(&self) -> String {
        format!("{}:{}", self.network.bind_addr, self.network.tunnel_port)
    }
}
