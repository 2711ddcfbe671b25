//! Plain-text plan rendering.

use std::collections::BTreeMap;
use std::fmt::Write;

use grantplan_core::errors::{ErrorCode, UnitFailure};
use grantplan_core::types::{GrantDiff, GrantSet, Plan};

/// The whole plan: roles first, then users, each in name order.
pub fn render_plan(plan: &Plan, verbose: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Plan {} (created {})",
        plan.plan_id,
        plan.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    render_section(&mut out, "ROLE", &plan.roles, verbose);
    render_section(&mut out, "USER", &plan.users, verbose);
    out
}

fn render_section(
    out: &mut String,
    kind: &str,
    entries: &BTreeMap<String, GrantDiff>,
    verbose: bool,
) {
    if entries.is_empty() {
        return;
    }
    out.push('\n');
    for (name, diff) in entries {
        if diff.is_noop() {
            let _ = writeln!(out, "{kind} {name}: no changes ({} in place)", diff.ok.len());
        } else {
            let _ = writeln!(
                out,
                "{kind} {name}: {} to revoke, {} to grant, {} in place",
                diff.to_revoke.len(),
                diff.to_grant.len(),
                diff.ok.len()
            );
        }
        lines(out, '-', &diff.to_revoke);
        lines(out, '+', &diff.to_grant);
        if verbose {
            lines(out, '=', &diff.ok);
        }
    }
}

fn lines(out: &mut String, marker: char, grants: &GrantSet) {
    for grant in grants {
        let _ = writeln!(out, "  {marker} {grant}");
    }
}

/// One line per failed unit.
pub fn render_failures(failures: &[UnitFailure]) -> String {
    let mut out = String::new();
    for failure in failures {
        let _ = writeln!(
            out,
            "{} {} failed: {}",
            failure.principal,
            failure.name,
            failure.error.coded_string()
        );
    }
    out
}
