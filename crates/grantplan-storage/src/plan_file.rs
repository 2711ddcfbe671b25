//! Plan history: every plan computed for an account, keyed by plan id.
//!
//! ```json
//! {
//!   "1704164645": {
//!     "CREATED_AT": "2024-01-02T03:04:05Z",
//!     "ROLES": { "R1": { "to_revoke": [], "ok": [...], "to_grant": [...] } },
//!     "USERS": {}
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use grantplan_core::errors::StorageError;
use grantplan_core::types::{GrantDiff, Plan, PlanId};
use serde::{Deserialize, Serialize};

use crate::fs::{read_json, write_json};
use crate::paths::AccountPaths;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlanRecord {
    #[serde(rename = "CREATED_AT")]
    created_at: DateTime<Utc>,
    #[serde(rename = "ROLES", default)]
    roles: BTreeMap<String, GrantDiff>,
    #[serde(rename = "USERS", default)]
    users: BTreeMap<String, GrantDiff>,
}

type PlanHistory = BTreeMap<PlanId, PlanRecord>;

/// The `.grantplan` file of one account.
#[derive(Debug, Clone)]
pub struct PlanStore {
    account: String,
    path: PathBuf,
}

impl PlanStore {
    pub fn new(paths: &AccountPaths) -> Self {
        Self {
            account: paths.account().to_string(),
            path: paths.plan_file(),
        }
    }

    /// Add `plan` to the history. Earlier plans are kept.
    pub fn append(&self, plan: &Plan) -> Result<(), StorageError> {
        let mut history: PlanHistory = read_json(&self.path)?.unwrap_or_default();
        let record = PlanRecord {
            created_at: plan.created_at,
            roles: plan.roles.clone(),
            users: plan.users.clone(),
        };
        if history.insert(plan.plan_id, record).is_some() {
            tracing::warn!(
                account = %self.account,
                plan_id = %plan.plan_id,
                "replacing a plan with the same id"
            );
        }
        write_json(&self.path, &history)?;
        tracing::info!(
            account = %self.account,
            plan_id = %plan.plan_id,
            plans = history.len(),
            "plan written"
        );
        Ok(())
    }

    /// The plan with the greatest id.
    pub fn latest(&self) -> Result<Plan, StorageError> {
        let history: PlanHistory = read_json(&self.path)?.unwrap_or_default();
        let (plan_id, record) =
            history.into_iter().next_back().ok_or_else(|| StorageError::PlanNotFound {
                account: self.account.clone(),
            })?;
        Ok(Plan {
            plan_id,
            created_at: record.created_at,
            roles: record.roles,
            users: record.users,
        })
    }

    /// Every stored plan id, oldest first.
    pub fn plan_ids(&self) -> Result<Vec<PlanId>, StorageError> {
        let history: PlanHistory = read_json(&self.path)?.unwrap_or_default();
        Ok(history.into_keys().collect())
    }
}
