//! Plan Assembler.
//!
//! One unit per role (current grants, expansion, diff) and one per user
//! (current role memberships, diff). Units return their results; the
//! assembler merges them into a `Plan` keyed by name after the phase ends.

use std::time::Instant;

use chrono::{DateTime, Utc};
use grantplan_core::access::AccessConfig;
use grantplan_core::config::FailurePolicy;
use grantplan_core::errors::{PlanError, UnitFailure};
use grantplan_core::naming::canonical_principal;
use grantplan_core::types::{CurrentState, Grant, GrantDiff, GrantSet, Plan, PlanId, Principal};

use super::CurrentGrants;
use crate::diff::diff;
use crate::expand::ProfileExpander;
use crate::pool::{PoolOutcome, WorkPool};

/// Identity and timestamp of one run, injected so runs are reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    pub plan_id: PlanId,
    pub created_at: DateTime<Utc>,
}

impl RunContext {
    pub fn at(created_at: DateTime<Utc>) -> Self {
        Self {
            plan_id: PlanId::from_timestamp(created_at),
            created_at,
        }
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }
}

/// Everything one planning run produced.
#[derive(Debug)]
pub struct PlanOutcome {
    pub plan: Plan,
    /// Current grants each successful unit diffed against.
    pub observed: CurrentState,
    /// Units that failed under the collect policy.
    pub failures: Vec<UnitFailure>,
}

pub struct PlanAssembler<'a> {
    pool: &'a WorkPool,
    expander: ProfileExpander<'a>,
    current: &'a dyn CurrentGrants,
}

impl<'a> PlanAssembler<'a> {
    pub fn new(
        pool: &'a WorkPool,
        expander: ProfileExpander<'a>,
        current: &'a dyn CurrentGrants,
    ) -> Self {
        Self {
            pool,
            expander,
            current,
        }
    }

    /// Plan `roles` and `users` against `access`.
    pub fn assemble(
        &self,
        ctx: RunContext,
        access: &AccessConfig,
        roles: &[String],
        users: &[String],
    ) -> Result<PlanOutcome, PlanError> {
        let started = Instant::now();
        let mut outcome = PlanOutcome {
            plan: Plan::new(ctx.plan_id, ctx.created_at),
            observed: CurrentState::default(),
            failures: Vec::new(),
        };

        let role_results =
            self.pool.run("roles", roles.to_vec(), |role| self.plan_role(access, role));
        self.merge(&mut outcome, Principal::Role, role_results)?;

        if !users.is_empty() {
            let user_results =
                self.pool.run("users", users.to_vec(), |user| self.plan_user(access, user));
            self.merge(&mut outcome, Principal::User, user_results)?;
        }

        tracing::info!(
            plan_id = %ctx.plan_id,
            roles = outcome.plan.roles.len(),
            users = outcome.plan.users.len(),
            failed = outcome.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "plan assembled"
        );
        Ok(outcome)
    }

    fn plan_role(
        &self,
        access: &AccessConfig,
        role: &str,
    ) -> Result<(GrantSet, GrantDiff), PlanError> {
        let bindings = access
            .roles
            .get(role)
            .map(|config| config.profiles.as_slice())
            .unwrap_or_default();
        let target = self.expander.expand_role(role, bindings, &access.profiles)?;
        let current = self.current.role(role)?;
        let diff = diff(&current, &target);
        tracing::debug!(
            role,
            revoke = diff.to_revoke.len(),
            ok = diff.ok.len(),
            grant = diff.to_grant.len(),
            "planned role"
        );
        Ok((current, diff))
    }

    fn plan_user(
        &self,
        access: &AccessConfig,
        user: &str,
    ) -> Result<(GrantSet, GrantDiff), PlanError> {
        let target: GrantSet = access
            .users
            .get(user)
            .map(|config| config.roles.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|role| Grant::role_membership(&canonical_principal(role)))
            .collect();
        let current = self.current.user(user)?;
        let diff = diff(&current, &target);
        tracing::debug!(
            user,
            revoke = diff.to_revoke.len(),
            ok = diff.ok.len(),
            grant = diff.to_grant.len(),
            "planned user"
        );
        Ok((current, diff))
    }

    /// Fold one phase into the outcome. Each name is contributed exactly once.
    fn merge(
        &self,
        outcome: &mut PlanOutcome,
        principal: Principal,
        results: PoolOutcome<String, (GrantSet, GrantDiff), PlanError>,
    ) -> Result<(), PlanError> {
        if self.pool.policy() == FailurePolicy::FailFast {
            if let Some((_, error)) = results.failed.into_iter().next() {
                return Err(error);
            }
        } else {
            for (name, error) in results.failed {
                tracing::warn!(%principal, name = %name, error = %error, "unit failed");
                outcome.failures.push(UnitFailure { principal, name, error });
            }
        }

        for (name, (current, diff)) in results.succeeded {
            outcome.plan.insert(principal, name.clone(), diff)?;
            let observed = match principal {
                Principal::Role => &mut outcome.observed.roles,
                Principal::User => &mut outcome.observed.users,
            };
            observed.insert(name, current);
        }
        Ok(())
    }
}
