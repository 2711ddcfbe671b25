//! Profile Expander: profiles plus parameter bindings become target grants.

pub mod expander;
pub mod pattern;

pub use expander::ProfileExpander;
pub use pattern::NamePattern;
