//! A transport that answers queries from a recorded JSON file.
//!
//! ```json
//! {
//!   "queries": {
//!     "SHOW TABLES IN ACCOUNT": { "query_id": "q-tables", "rows": [] },
//!     "SELECT *, CONCAT_WS(...) FROM TABLE(RESULT_SCAN('q-tables'))": {
//!       "rows": [{ "name": "T1" }]
//!     },
//!     "SHOW GRANTS TO ROLE \"R1\"": { "error": "role does not exist" }
//!   }
//! }
//! ```
//!
//! Queries are matched on their exact text. `query_id` defaults to the query
//! text itself. A query with no recording fails.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use grantplan_core::errors::{StorageError, TransportError};
use grantplan_core::traits::{QueryResult, Session, SessionFactory};
use grantplan_core::types::RawRow;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
struct Recorded {
    #[serde(default)]
    query_id: Option<String>,
    #[serde(default)]
    rows: Vec<RawRow>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Recording {
    #[serde(default)]
    queries: BTreeMap<String, Recorded>,
}

#[derive(Debug, Clone)]
pub struct ReplayTransport {
    queries: Arc<BTreeMap<String, Recorded>>,
}

impl ReplayTransport {
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let content = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Self::parse(json, &PathBuf::from("<string>"))
    }

    fn parse(json: &str, origin: &Path) -> Result<Self, StorageError> {
        let recording: Recording = serde_json::from_str(json).map_err(|e| StorageError::Decode {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(
            queries = recording.queries.len(),
            origin = %origin.display(),
            "loaded query recording"
        );
        Ok(Self {
            queries: Arc::new(recording.queries),
        })
    }
}

impl SessionFactory for ReplayTransport {
    fn open(&self) -> Result<Box<dyn Session>, TransportError> {
        Ok(Box::new(ReplaySession {
            queries: Arc::clone(&self.queries),
        }))
    }
}

struct ReplaySession {
    queries: Arc<BTreeMap<String, Recorded>>,
}

impl Session for ReplaySession {
    fn execute(&mut self, sql: &str, _timeout: Duration) -> Result<QueryResult, TransportError> {
        let recorded = self.queries.get(sql).ok_or_else(|| TransportError::QueryFailed {
            query: sql.to_string(),
            message: "no recorded result".to_string(),
        })?;
        if let Some(message) = &recorded.error {
            return Err(TransportError::QueryFailed {
                query: sql.to_string(),
                message: message.clone(),
            });
        }
        let query_id = recorded.query_id.clone().unwrap_or_else(|| sql.to_string());
        Ok(QueryResult::new(query_id, recorded.rows.clone()))
    }
}
