//! Cache and plan file errors.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};

/// Errors that can occur while reading or writing persisted state.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not encode {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error("could not decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("no cache for account {account}; run a plan with --rescan first")]
    CacheNotFound { account: String },

    #[error("no plan for account {account}; run a plan first")]
    PlanNotFound { account: String },
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        error_code::STORAGE_ERROR
    }
}
