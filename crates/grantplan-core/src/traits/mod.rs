//! Trait seams between the engine and the outside world.

pub mod session;

pub use session::{QueryResult, Session, SessionFactory};
