//! Scan and planning configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Owning containers whose name ends in an environment suffix are transient.
pub const DEFAULT_TRANSIENT_PATTERN: &str = "_(DEV|QA|PROD)_[0-9]{1,5}$";

/// Whether independent units run one after another or on a worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    #[default]
    Concurrent,
    Sequential,
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concurrent" => Ok(Self::Concurrent),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!("unknown scan mode '{other}'")),
        }
    }
}

/// What a failing unit does to the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run, reporting the first failing unit in unit order.
    FailFast,
    /// Run every unit; report failures next to the successes.
    #[default]
    Collect,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(Self::FailFast),
            "collect" => Ok(Self::Collect),
            other => Err(format!("unknown failure policy '{other}'")),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FailFast => "fail_fast",
            Self::Collect => "collect",
        })
    }
}

/// Configuration for catalog scans and per-principal planning.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Worker threads for concurrent mode. 0 = auto-detect.
    pub threads: Option<usize>,
    /// Execution mode. Default: concurrent.
    pub mode: Option<ScanMode>,
    /// Failure policy. Default: collect.
    pub failure_policy: Option<FailurePolicy>,
    /// Budget for every remote query, in seconds. Default: 300.
    pub query_timeout_secs: Option<u64>,
    /// Canonical object names matching any of these are dropped from the catalog.
    #[serde(default)]
    pub ignore_objects: Vec<String>,
    /// Owning-container names matching this are treated as transient.
    pub transient_pattern: Option<String>,
}

impl ScanConfig {
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(0)
    }

    pub fn effective_mode(&self) -> ScanMode {
        self.mode.unwrap_or_default()
    }

    pub fn effective_failure_policy(&self) -> FailurePolicy {
        self.failure_policy.unwrap_or_default()
    }

    /// Returns the effective query timeout, defaulting to 300 seconds.
    pub fn effective_query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs.unwrap_or(300))
    }

    pub fn effective_transient_pattern(&self) -> &str {
        self.transient_pattern.as_deref().unwrap_or(DEFAULT_TRANSIENT_PATTERN)
    }
}
