//! Plans, per-principal diffs, and the state snapshot a plan is computed from.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::ObjectCatalog;
use super::grant::GrantSet;
use crate::errors::PlanError;

/// Run-scoped plan identifier: Unix seconds of the run's creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(pub i64);

impl PlanId {
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.timestamp())
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Three-way partition of current against target grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantDiff {
    pub to_revoke: GrantSet,
    pub ok: GrantSet,
    pub to_grant: GrantSet,
}

impl GrantDiff {
    /// Whether applying this diff would change nothing.
    pub fn is_noop(&self) -> bool {
        self.to_revoke.is_empty() && self.to_grant.is_empty()
    }
}

/// Which kind of principal a plan entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Principal {
    Role,
    User,
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Role => "role",
            Self::User => "user",
        })
    }
}

/// The complete set of per-role and per-user diffs from one run.
///
/// Entries are contributed exactly once per name; `insert` refuses to
/// overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub plan_id: PlanId,
    pub created_at: DateTime<Utc>,
    pub roles: BTreeMap<String, GrantDiff>,
    pub users: BTreeMap<String, GrantDiff>,
}

impl Plan {
    pub fn new(plan_id: PlanId, created_at: DateTime<Utc>) -> Self {
        Self {
            plan_id,
            created_at,
            roles: BTreeMap::new(),
            users: BTreeMap::new(),
        }
    }

    /// Add one principal's diff. A name seen twice is a defect in the caller.
    pub fn insert(
        &mut self,
        principal: Principal,
        name: String,
        diff: GrantDiff,
    ) -> Result<(), PlanError> {
        let entries = match principal {
            Principal::Role => &mut self.roles,
            Principal::User => &mut self.users,
        };
        match entries.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(diff);
                Ok(())
            }
            Entry::Occupied(slot) => Err(PlanError::DuplicateEntry {
                principal,
                name: slot.key().clone(),
            }),
        }
    }
}

/// Filtered current grants, as cached between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentState {
    #[serde(default)]
    pub roles: BTreeMap<String, GrantSet>,
    #[serde(default)]
    pub users: BTreeMap<String, GrantSet>,
}

/// Everything a plan is computed from: the classified catalog and the
/// current state observed alongside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub catalog: ObjectCatalog,
    pub current: CurrentState,
}
