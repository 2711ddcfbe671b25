//! Error handling for grantplan.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod expansion_error;
pub mod plan_error;
pub mod scan_error;
pub mod storage_error;
pub mod transport_error;

pub use config_error::ConfigError;
pub use error_code::ErrorCode;
pub use expansion_error::ExpansionError;
pub use plan_error::{PlanError, UnitFailure};
pub use scan_error::ScanError;
pub use storage_error::StorageError;
pub use transport_error::TransportError;
