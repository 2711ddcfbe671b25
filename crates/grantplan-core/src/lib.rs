//! # grantplan-core
//!
//! Foundation crate for the grantplan access-control reconciliation engine.
//! Defines the data model, identifier naming rules, privilege tables, access
//! configuration, run configuration, errors, tracing setup, and the transport
//! traits. Every other crate in the workspace depends on this.

pub mod access;
pub mod config;
pub mod errors;
pub mod naming;
pub mod tables;
pub mod tracing;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use access::{AccessConfig, ProfileBinding, RoleConfig, RoleProfile, UserConfig};
pub use config::GrantplanConfig;
pub use errors::{
    ConfigError, ErrorCode, ExpansionError, PlanError, ScanError, StorageError, TransportError,
};
pub use tables::PrivilegeTables;
pub use types::{
    CurrentState, Grant, GrantDiff, GrantSet, ObjectCatalog, ObjectType, Plan, PlanId, Principal,
    RawRow, RowValue, SecurableObject, Snapshot,
};
