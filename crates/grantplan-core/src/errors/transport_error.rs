//! Transport errors raised by a `Session` while talking to the remote system.

use super::error_code::{self, ErrorCode};

/// Errors that can occur while issuing a query.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("could not open session: {message}")]
    ConnectFailed { message: String },

    #[error("query failed: {message} (query: {query})")]
    QueryFailed { query: String, message: String },

    #[error("query timed out after {timeout_ms}ms (query: {query})")]
    Timeout { query: String, timeout_ms: u64 },

    #[error("session lost after an earlier timeout")]
    SessionLost,

    #[error("missing column '{column}' in result of: {query}")]
    MissingColumn { query: String, column: String },
}

impl ErrorCode for TransportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => error_code::TIMEOUT,
            _ => error_code::TRANSPORT_ERROR,
        }
    }
}
