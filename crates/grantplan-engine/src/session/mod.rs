//! Session handling: every query a unit issues goes through a `BoundedSession`.

pub mod bounded;

pub use bounded::BoundedSession;
