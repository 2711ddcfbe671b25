//! Plan errors and per-unit failure reporting.

use super::error_code::{self, ErrorCode};
use super::{ConfigError, ExpansionError, ScanError, StorageError};
use crate::types::Principal;

/// Errors that can occur while producing a plan.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("role {role}: {source}")]
    Expansion { role: String, source: ExpansionError },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("catalog is incomplete, refusing to plan: {}", summarize(.failures))]
    IncompleteCatalog { failures: Vec<ScanError> },

    #[error("plan entry for {principal} {name} was computed twice")]
    DuplicateEntry { principal: Principal, name: String },

    #[error("no cached current state for {principal} {name}; rescan to capture it")]
    MissingCurrentState { principal: Principal, name: String },

    #[error("could not start worker pool: {message}")]
    Pool { message: String },
}

fn summarize(failures: &[ScanError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ErrorCode for PlanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Scan(e) => e.error_code(),
            Self::Expansion { source, .. } => source.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::IncompleteCatalog { .. } => error_code::INCOMPLETE_CATALOG,
            Self::DuplicateEntry { .. } => error_code::DUPLICATE_ENTRY,
            Self::MissingCurrentState { .. } => error_code::MISSING_STATE,
            Self::Pool { .. } => error_code::PLAN_ERROR,
        }
    }
}

/// A unit of work (one role or user) that failed under the collect policy.
#[derive(Debug)]
pub struct UnitFailure {
    pub principal: Principal,
    pub name: String,
    pub error: PlanError,
}
