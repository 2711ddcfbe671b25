//! Fetch errors, each scoped to the unit (object type, role, user) that failed.

use super::error_code::{self, ErrorCode};
use super::TransportError;
use crate::types::ObjectType;

/// Errors that can occur while inventorying objects or fetching grants.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScanError {
    #[error("failed to fetch {object_type} objects: {source}")]
    ObjectFetch {
        object_type: ObjectType,
        source: TransportError,
    },

    #[error("failed to fetch grants to role {role}: {source}")]
    RoleGrantFetch { role: String, source: TransportError },

    #[error("failed to fetch roles granted to user {user}: {source}")]
    UserGrantFetch { user: String, source: TransportError },
}

impl ScanError {
    /// The underlying transport failure.
    pub fn transport(&self) -> &TransportError {
        match self {
            Self::ObjectFetch { source, .. }
            | Self::RoleGrantFetch { source, .. }
            | Self::UserGrantFetch { source, .. } => source,
        }
    }
}

impl ErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self.transport() {
            TransportError::Timeout { .. } => error_code::TIMEOUT,
            _ => error_code::SCAN_ERROR,
        }
    }
}
