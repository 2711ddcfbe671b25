//! Data model shared by the engine, storage, and CLI crates.

pub mod catalog;
pub mod grant;
pub mod object;
pub mod object_type;
pub mod plan;
pub mod row;

pub use catalog::ObjectCatalog;
pub use grant::{future_label, FutureScope, Grant, GrantSet};
pub use object::{ObjectFlags, SecurableObject};
pub use object_type::{ObjectType, OwnerField};
pub use plan::{CurrentState, GrantDiff, Plan, PlanId, Principal, Snapshot};
pub use row::{RawRow, RowValue, UNREPRESENTABLE};
