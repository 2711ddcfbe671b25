//! Bounded work pool for independent units (object types, roles, users).

pub mod failure_mark;
pub mod work_pool;

pub use failure_mark::FailureMark;
pub use work_pool::{ExecutionMode, PoolOutcome, WorkPool};
