//! The grant cache: the classified catalog and the current grants observed by
//! the last live run.
//!
//! ```json
//! {
//!   "local_cached_time": "2024-01-02 03:04:05",
//!   "objects": { "table": { "DB1.SCH1.T1": { "database": "DB1", ... } } },
//!   "current_state": {
//!     "roles": { "R1": [["SELECT", "TABLE", "DB1.SCH1.T1"]] },
//!     "users": { "ALICE": [["USAGE", "ROLE", "R1"]] }
//!   }
//! }
//! ```
//!
//! Column values the format cannot hold are written as the
//! `"<unrepresentable>"` marker; they never abort the write.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use grantplan_core::errors::StorageError;
use grantplan_core::types::{
    CurrentState, ObjectCatalog, ObjectFlags, ObjectType, RowValue, SecurableObject, Snapshot,
};
use serde::{Deserialize, Serialize};

use crate::fs::{read_json, write_json};
use crate::paths::AccountPaths;

/// `strftime` format of `local_cached_time`.
pub const LOCAL_CACHED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One object, keyed by its full name in the cache document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ObjectRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
    #[serde(default)]
    flags: ObjectFlags,
    #[serde(default)]
    attributes: BTreeMap<String, RowValue>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheDocument {
    local_cached_time: String,
    #[serde(default)]
    objects: BTreeMap<ObjectType, BTreeMap<String, ObjectRecord>>,
    #[serde(default)]
    current_state: CurrentState,
}

/// A snapshot as read back from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSnapshot {
    /// `local_cached_time` as written.
    pub cached_at: String,
    pub snapshot: Snapshot,
}

/// The `.grantcache` file of one account.
#[derive(Debug, Clone)]
pub struct GrantCache {
    account: String,
    path: PathBuf,
}

impl GrantCache {
    pub fn new(paths: &AccountPaths) -> Self {
        Self {
            account: paths.account().to_string(),
            path: paths.cache_file(),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the cached snapshot. A missing cache is `CacheNotFound`.
    pub fn load(&self) -> Result<CachedSnapshot, StorageError> {
        let document: CacheDocument =
            read_json(&self.path)?.ok_or_else(|| StorageError::CacheNotFound {
                account: self.account.clone(),
            })?;

        let catalog: ObjectCatalog = document
            .objects
            .into_iter()
            .map(|(object_type, records)| {
                let objects = records
                    .into_iter()
                    .map(|(name, record)| SecurableObject {
                        object_type,
                        name,
                        database: record.database,
                        schema: record.schema,
                        flags: record.flags,
                        attributes: record.attributes,
                    })
                    .collect();
                (object_type, objects)
            })
            .collect();

        tracing::debug!(
            account = %self.account,
            objects = catalog.len(),
            roles = document.current_state.roles.len(),
            users = document.current_state.users.len(),
            cached_at = %document.local_cached_time,
            "loaded grant cache"
        );
        Ok(CachedSnapshot {
            cached_at: document.local_cached_time,
            snapshot: Snapshot {
                catalog,
                current: document.current_state,
            },
        })
    }

    /// Replace the cache with `snapshot`, stamped with `cached_at`.
    /// Returns the number of column values written as the marker.
    pub fn store(
        &self,
        snapshot: &Snapshot,
        cached_at: DateTime<Local>,
    ) -> Result<usize, StorageError> {
        let mut degraded = 0usize;
        let mut objects: BTreeMap<ObjectType, BTreeMap<String, ObjectRecord>> = BTreeMap::new();
        for (object_type, bucket) in snapshot.catalog.buckets() {
            let records = objects.entry(object_type).or_default();
            for object in bucket {
                degraded += object.attributes.values().filter(|v| v.degrades()).count();
                records.insert(
                    object.name.clone(),
                    ObjectRecord {
                        database: object.database.clone(),
                        schema: object.schema.clone(),
                        flags: object.flags.clone(),
                        attributes: object.attributes.clone(),
                    },
                );
            }
        }

        let document = CacheDocument {
            local_cached_time: cached_at.format(LOCAL_CACHED_TIME_FORMAT).to_string(),
            objects,
            current_state: snapshot.current.clone(),
        };
        write_json(&self.path, &document)?;

        if degraded > 0 {
            tracing::warn!(
                account = %self.account,
                degraded,
                "some cached values were written as placeholders"
            );
        }
        tracing::info!(
            account = %self.account,
            path = %self.path.display(),
            objects = snapshot.catalog.len(),
            "grant cache written"
        );
        Ok(degraded)
    }
}

/// Current state for the next cache: what this run observed, on top of what
/// earlier runs captured for principals this run did not plan.
pub fn merge_current(previous: CurrentState, observed: CurrentState) -> CurrentState {
    let mut merged = previous;
    merged.roles.extend(observed.roles);
    merged.users.extend(observed.users);
    merged
}

#[cfg(test)]
mod tests {
    use grantplan_core::types::Grant;

    use super::*;

    #[test]
    fn observed_state_wins() {
        let mut previous = CurrentState::default();
        previous.roles.insert("R1".into(), [Grant::new("SELECT", "TABLE", "OLD")].into());
        previous.roles.insert("R2".into(), Default::default());
        let mut observed = CurrentState::default();
        observed.roles.insert("R1".into(), [Grant::new("SELECT", "TABLE", "NEW")].into());

        let merged = merge_current(previous, observed);
        assert_eq!(merged.roles.len(), 2);
        assert!(merged.roles["R1"].contains(&Grant::new("SELECT", "TABLE", "NEW")));
    }
}
