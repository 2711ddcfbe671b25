//! Configuration errors.

use super::error_code::{self, ErrorCode};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Invalid config value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("role {role} references profile {profile}, which is not defined")]
    UnknownProfile { role: String, profile: String },

    #[error("role {role} is not defined in the access configuration")]
    UnknownRole { role: String },

    #[error("profile {profile} uses unknown object type '{object_type}'")]
    UnknownObjectType { profile: String, object_type: String },

    #[error(
        "profile {profile} uses privilege group '{group}', \
         which is not defined for {object_type}"
    )]
    UnknownPrivilegeGroup {
        profile: String,
        object_type: String,
        group: String,
    },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownProfile { .. } => error_code::UNKNOWN_PROFILE,
            _ => error_code::CONFIG_ERROR,
        }
    }
}
