//! Provider settings.
//!
//! Read from `config.json` in the vcs-bridge configuration directory, or from
//! the file named by `VCS_BRIDGE_CONFIG`. A missing file means defaults.
//! Settings are never written back.

use crate::core::dirs::get_config_directory;
use crate::core::error::{Result, VcsBridgeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV_VAR: &str = "VCS_BRIDGE_CONFIG";

/// Longest accepted cache staleness: one year
pub const MAX_STALE_AFTER_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub service_url: String,
    pub nonce_path: Option<PathBuf>,
    /// Overrides repository discovery from the working directory
    pub repository_root: Option<PathBuf>,
    /// Directories, relative to the repository root, refreshed by full status updates
    pub content_roots: Vec<PathBuf>,
    pub lockable_patterns: Vec<String>,
    /// Size of the background pool. 0 runs every command inline.
    pub worker_threads: usize,
    /// Seconds between background fetches. 0 disables polling.
    pub poll_interval_secs: u64,
    pub status_timeout_secs: u64,
    pub long_timeout_secs: u64,
    /// Age after which a cached entry is refreshed on `RefreshStale` queries
    pub stale_after_secs: u64,
    /// Lock owner name, when it differs from the service's user
    pub lock_user: Option<String>,
    /// Consecutive failed status refreshes before the provider disables itself
    pub max_consecutive_failures: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8484".to_string(),
            nonce_path: None,
            repository_root: None,
            content_roots: vec![PathBuf::from("Content"), PathBuf::from("Config")],
            lockable_patterns: vec!["*.uasset".to_string(), "*.umap".to_string()],
            worker_threads: 2,
            poll_interval_secs: 30,
            status_timeout_secs: 30,
            long_timeout_secs: 300,
            stale_after_secs: 30,
            lock_user: None,
            max_consecutive_failures: 3,
        }
    }
}

impl ProviderConfig {
    /// Load from `VCS_BRIDGE_CONFIG` or the default location
    pub fn load() -> Result<Self> {
        let config_file = match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => PathBuf::from(path),
            None => get_config_directory()?.join("config.json"),
        };
        Self::load_from(&config_file)
    }

    pub fn load_from(config_file: &Path) -> Result<Self> {
        if !config_file.exists() {
            log::debug!(
                "No config file at '{}', using defaults",
                config_file.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_file)
            .map_err(|e| VcsBridgeError::config_read_failed(config_file, e))?;
        serde_json::from_str(&content)
            .map_err(|e| VcsBridgeError::config_parse_failed(config_file, e))
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        match self.poll_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    pub fn long_timeout(&self) -> Duration {
        Duration::from_secs(self.long_timeout_secs)
    }

    /// Clamped to [`MAX_STALE_AFTER_SECS`]
    pub fn stale_after(&self) -> chrono::Duration {
        let secs = self.stale_after_secs.min(MAX_STALE_AFTER_SECS) as i64;
        chrono::Duration::try_seconds(secs).unwrap_or_else(chrono::Duration::zero)
    }
}
