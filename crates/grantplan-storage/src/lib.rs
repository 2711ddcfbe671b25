//! # grantplan-storage
//!
//! Everything grantplan keeps between runs, one directory per account:
//! the access configuration, optional privilege-table overrides, the grant
//! cache (catalog plus observed current state) and the plan history.

pub mod cache;
pub mod paths;
pub mod plan_file;

mod fs;

pub use cache::{merge_current, CachedSnapshot, GrantCache, LOCAL_CACHED_TIME_FORMAT};
pub use paths::AccountPaths;
pub use plan_file::PlanStore;
