//! # grantplan-engine
//!
//! The reconciliation pipeline: inventory the remote catalog, classify it,
//! expand profiles into target grants, normalize currently-held grants,
//! diff the two, and assemble the per-role and per-user results into a plan.
//!
//! Classification, expansion and diffing are pure. Only the catalog builder
//! and the grant fetchers talk to a `Session`, always through a
//! `BoundedSession` so every query runs under the configured timeout.

pub mod catalog;
pub mod diff;
pub mod expand;
pub mod grants;
pub mod pipeline;
pub mod plan;
pub mod pool;
pub mod session;
pub mod sql;

pub use catalog::{classify, CatalogBuilder, IgnoreSet, TransientPattern};
pub use diff::diff;
pub use expand::ProfileExpander;
pub use grants::GrantNormalizer;
pub use pipeline::{PlanRequest, PlanRun, Planner, SnapshotSource};
pub use plan::{PlanAssembler, PlanOutcome, RunContext};
pub use pool::{ExecutionMode, PoolOutcome, WorkPool};
pub use session::BoundedSession;
