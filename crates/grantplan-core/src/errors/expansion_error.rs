//! Profile expansion errors.

use super::error_code::{self, ErrorCode};

/// Errors that can occur while expanding a profile into grants.
/// Fatal for the profile being expanded; other roles are unaffected.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExpansionError {
    #[error(
        "profile {profile}: pattern '{pattern}' needs parameter '{parameter}', \
         which is not bound"
    )]
    UnboundParameter {
        profile: String,
        pattern: String,
        parameter: String,
    },

    #[error("profile {profile}: pattern '{pattern}' is not a valid expression: {message}")]
    InvalidPattern {
        profile: String,
        pattern: String,
        message: String,
    },

    #[error("profile {profile}: unknown object type '{object_type}'")]
    UnknownObjectType { profile: String, object_type: String },

    #[error("profile {profile}: no privilege group '{group}' for {object_type}")]
    UnknownPrivilegeGroup {
        profile: String,
        object_type: String,
        group: String,
    },
}

impl ErrorCode for ExpansionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnboundParameter { .. } => error_code::UNBOUND_PARAMETER,
            _ => error_code::EXPANSION_ERROR,
        }
    }
}
