//! Catalog construction: per-type inventory, then classification.

pub mod builder;
pub mod classifier;

pub use builder::{fetch_objects, CatalogBuilder, IgnoreSet};
pub use classifier::{classify, TransientPattern};
