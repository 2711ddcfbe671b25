//! Plan Assembler and the sources of current grants it diffs against.

pub mod assembler;
pub mod current;

pub use assembler::{PlanAssembler, PlanOutcome, RunContext};
pub use current::{CachedGrants, CurrentGrants, LiveGrants};
