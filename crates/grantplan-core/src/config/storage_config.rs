//! Storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where per-account state lives.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of the per-account directories. Default: `~/.grantplan/accounts`.
    pub state_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn effective_state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(|| super::grantplan_config::dirs_path().join("accounts"))
    }
}
