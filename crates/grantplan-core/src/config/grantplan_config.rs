//! Top-level grantplan configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{FailurePolicy, ScanConfig, ScanMode, StorageConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`GRANTPLAN_*`)
/// 3. Project config (`grantplan.toml` in the working directory)
/// 4. User config (`~/.grantplan/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GrantplanConfig {
    pub scan: ScanConfig,
    pub storage: StorageConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub threads: Option<usize>,
    pub mode: Option<ScanMode>,
    pub failure_policy: Option<FailurePolicy>,
    pub query_timeout_secs: Option<u64>,
    pub state_dir: Option<PathBuf>,
}

impl GrantplanConfig {
    /// Load configuration with layered resolution, then validate.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        let user_config_path = Self::user_config_path();
        if user_config_path.exists() {
            Self::merge_toml_file(&mut config, &user_config_path)?;
        }

        // Layer 3: project config
        let project_config_path = root.join("grantplan.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config)?;

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &GrantplanConfig) -> Result<(), ConfigError> {
        if config.scan.query_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "scan.query_timeout_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        for pattern in &config.scan.ignore_objects {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(ConfigError::ValidationFailed {
                    field: "scan.ignore_objects".to_string(),
                    message: format!("'{pattern}' is not a valid expression: {e}"),
                });
            }
        }
        if let Err(e) = regex::Regex::new(config.scan.effective_transient_pattern()) {
            return Err(ConfigError::ValidationFailed {
                field: "scan.transient_pattern".to_string(),
                message: e.to_string(),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.grantplan/config.toml`.
    fn user_config_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut GrantplanConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: GrantplanConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut GrantplanConfig, other: &GrantplanConfig) {
        // Scan
        if other.scan.threads.is_some() {
            base.scan.threads = other.scan.threads;
        }
        if other.scan.mode.is_some() {
            base.scan.mode = other.scan.mode;
        }
        if other.scan.failure_policy.is_some() {
            base.scan.failure_policy = other.scan.failure_policy;
        }
        if other.scan.query_timeout_secs.is_some() {
            base.scan.query_timeout_secs = other.scan.query_timeout_secs;
        }
        if !other.scan.ignore_objects.is_empty() {
            base.scan.ignore_objects = other.scan.ignore_objects.clone();
        }
        if other.scan.transient_pattern.is_some() {
            base.scan.transient_pattern = other.scan.transient_pattern.clone();
        }

        // Storage
        if other.storage.state_dir.is_some() {
            base.storage.state_dir = other.storage.state_dir.clone();
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `GRANTPLAN_SCAN_THREADS`, `GRANTPLAN_STATE_DIR`, etc.
    fn apply_env_overrides(config: &mut GrantplanConfig) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("GRANTPLAN_SCAN_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                config.scan.threads = Some(v);
            }
        }
        if let Ok(val) = std::env::var("GRANTPLAN_SCAN_MODE") {
            let mode = val.parse::<ScanMode>().map_err(|message| ConfigError::InvalidValue {
                field: "GRANTPLAN_SCAN_MODE".to_string(),
                message,
            })?;
            config.scan.mode = Some(mode);
        }
        if let Ok(val) = std::env::var("GRANTPLAN_SCAN_FAILURE_POLICY") {
            let policy = val.parse::<FailurePolicy>().map_err(|message| ConfigError::InvalidValue {
                field: "GRANTPLAN_SCAN_FAILURE_POLICY".to_string(),
                message,
            })?;
            config.scan.failure_policy = Some(policy);
        }
        if let Ok(val) = std::env::var("GRANTPLAN_SCAN_QUERY_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.scan.query_timeout_secs = Some(v);
            }
        }
        if let Ok(val) = std::env::var("GRANTPLAN_STATE_DIR") {
            config.storage.state_dir = Some(PathBuf::from(val));
        }
        Ok(())
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut GrantplanConfig, cli: &CliOverrides) {
        if let Some(v) = cli.threads {
            config.scan.threads = Some(v);
        }
        if let Some(v) = cli.mode {
            config.scan.mode = Some(v);
        }
        if let Some(v) = cli.failure_policy {
            config.scan.failure_policy = Some(v);
        }
        if let Some(v) = cli.query_timeout_secs {
            config.scan.query_timeout_secs = Some(v);
        }
        if let Some(ref v) = cli.state_dir {
            config.storage.state_dir = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns the user-level grantplan directory: `~/.grantplan/`.
pub(crate) fn dirs_path() -> PathBuf {
    home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".grantplan")
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
