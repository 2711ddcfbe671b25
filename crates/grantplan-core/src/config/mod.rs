//! Run configuration for grantplan.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod grantplan_config;
pub mod scan_config;
pub mod storage_config;

pub use grantplan_config::{CliOverrides, GrantplanConfig};
pub use scan_config::{FailurePolicy, ScanConfig, ScanMode, DEFAULT_TRANSIENT_PATTERN};
pub use storage_config::StorageConfig;
