//! Transport contract: a session issues query text and returns rows.

use std::time::Duration;

use crate::errors::TransportError;
use crate::types::RawRow;

/// Rows returned by one query, plus the id the remote system assigned to it.
///
/// The id scopes follow-up projection queries to this result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub query_id: String,
    pub rows: Vec<RawRow>,
}

impl QueryResult {
    pub fn new(query_id: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            query_id: query_id.into(),
            rows,
        }
    }
}

/// One connection/cursor to the remote system.
///
/// A session is owned by exactly one unit of work at a time. Implementations
/// should honour `timeout` themselves where they can; the engine enforces it
/// independently.
pub trait Session: Send {
    fn execute(&mut self, sql: &str, timeout: Duration) -> Result<QueryResult, TransportError>;
}

/// Opens sessions. Shared read-only across every unit of work.
pub trait SessionFactory: Send + Sync {
    fn open(&self) -> Result<Box<dyn Session>, TransportError>;
}
