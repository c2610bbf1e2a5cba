//! Root configuration model (`config.toml`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root of `config.toml`. Every field has a default so a partial or empty
/// file is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct FocusConfig {
    pub autosave: AutosaveConfig,
    pub storage: StorageConfig,
    pub network: NetworkConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Idle time after the last edit before the document is saved.
    pub delay_ms: u64,
    /// How long the "saved" indicator stays visible after a save.
    pub saved_indicator_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            delay_ms: 2000,
            saved_indicator_ms: 2000,
        }
    }
}

impl AutosaveConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn saved_indicator(&self) -> Duration {
        Duration::from_millis(self.saved_indicator_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory for document records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfig {
    /// When false, sessions never touch the network interface.
    pub enabled: bool,
    /// argv of the command that cuts network access.
    pub disable_command: Vec<String>,
    /// argv of the command that restores network access.
    pub enable_command: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let (disable_command, enable_command) = default_network_commands();
        Self {
            enabled: true,
            disable_command,
            enable_command,
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[cfg(target_os = "linux")]
fn default_network_commands() -> (Vec<String>, Vec<String>) {
    (
        argv(&["nmcli", "networking", "off"]),
        argv(&["nmcli", "networking", "on"]),
    )
}

#[cfg(target_os = "macos")]
fn default_network_commands() -> (Vec<String>, Vec<String>) {
    (
        argv(&["networksetup", "-setairportpower", "en0", "off"]),
        argv(&["networksetup", "-setairportpower", "en0", "on"]),
    )
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn default_network_commands() -> (Vec<String>, Vec<String>) {
    let _ = argv;
    (Vec::new(), Vec::new())
}
