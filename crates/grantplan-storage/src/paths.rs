//! Per-account directory layout.

use std::path::{Path, PathBuf};

use grantplan_core::errors::StorageError;

const ACCESS_FILE: &str = "access.yaml";
const TABLES_FILE: &str = "tables.toml";
const CACHE_FILE: &str = ".grantcache";
const PLAN_FILE: &str = ".grantplan";

/// `<state_dir>/<ACCOUNT>/` and the files inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPaths {
    account: String,
    dir: PathBuf,
}

impl AccountPaths {
    pub fn new(state_dir: &Path, account: &str) -> Self {
        Self {
            account: account.to_string(),
            dir: state_dir.join(account),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Profiles, role bindings and user assignments.
    pub fn access_file(&self) -> PathBuf {
        self.dir.join(ACCESS_FILE)
    }

    /// Optional privilege-table overrides.
    pub fn tables_file(&self) -> PathBuf {
        self.dir.join(TABLES_FILE)
    }

    pub fn cache_file(&self) -> PathBuf {
        self.dir.join(CACHE_FILE)
    }

    pub fn plan_file(&self) -> PathBuf {
        self.dir.join(PLAN_FILE)
    }

    /// Create the account directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })
    }
}
