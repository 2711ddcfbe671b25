//! Grant Differ: three-way partition of current against target grants.

use grantplan_core::types::{GrantDiff, GrantSet};

/// `to_revoke = current − target`, `ok = current ∩ target`,
/// `to_grant = target − current`.
pub fn diff(current: &GrantSet, target: &GrantSet) -> GrantDiff {
    GrantDiff {
        to_revoke: current.difference(target).cloned().collect(),
        ok: current.intersection(target).cloned().collect(),
        to_grant: target.difference(current).cloned().collect(),
    }
}
