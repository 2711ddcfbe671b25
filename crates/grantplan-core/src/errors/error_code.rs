//! ErrorCode trait for stable, machine-readable error codes.

/// Every error enum implements this to provide a structured code string
/// alongside its human-readable message.
pub trait ErrorCode {
    /// Returns the error code string (e.g., "TRANSPORT_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
pub const TIMEOUT: &str = "TIMEOUT";
pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const EXPANSION_ERROR: &str = "EXPANSION_ERROR";
pub const UNBOUND_PARAMETER: &str = "UNBOUND_PARAMETER";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const UNKNOWN_PROFILE: &str = "UNKNOWN_PROFILE";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const INCOMPLETE_CATALOG: &str = "INCOMPLETE_CATALOG";
pub const DUPLICATE_ENTRY: &str = "DUPLICATE_ENTRY";
pub const MISSING_STATE: &str = "MISSING_STATE";
pub const PLAN_ERROR: &str = "PLAN_ERROR";
