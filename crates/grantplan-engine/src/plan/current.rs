//! Where a unit of work gets the grants a principal holds now.

use std::sync::Arc;
use std::time::Duration;

use grantplan_core::errors::{PlanError, ScanError};
use grantplan_core::naming::canonical_principal;
use grantplan_core::traits::SessionFactory;
use grantplan_core::types::{CurrentState, GrantSet, Principal};

use crate::grants::GrantNormalizer;
use crate::session::BoundedSession;

/// Current grants per principal. Shared read-only by every unit.
pub trait CurrentGrants: Sync {
    fn role(&self, role: &str) -> Result<GrantSet, PlanError>;
    fn user(&self, user: &str) -> Result<GrantSet, PlanError>;
}

/// Fetches from the remote system; every call opens its own session.
pub struct LiveGrants<'a> {
    factory: Arc<dyn SessionFactory>,
    timeout: Duration,
    normalizer: GrantNormalizer<'a>,
}

impl<'a> LiveGrants<'a> {
    pub fn new(
        factory: Arc<dyn SessionFactory>,
        timeout: Duration,
        normalizer: GrantNormalizer<'a>,
    ) -> Self {
        Self {
            factory,
            timeout,
            normalizer,
        }
    }
}

impl CurrentGrants for LiveGrants<'_> {
    fn role(&self, role: &str) -> Result<GrantSet, PlanError> {
        let principal = canonical_principal(role);
        let mut session = BoundedSession::open(&self.factory, self.timeout).map_err(|source| {
            ScanError::RoleGrantFetch {
                role: role.to_string(),
                source,
            }
        })?;
        Ok(self.normalizer.fetch_role(&mut session, &principal)?)
    }

    fn user(&self, user: &str) -> Result<GrantSet, PlanError> {
        let principal = canonical_principal(user);
        let mut session = BoundedSession::open(&self.factory, self.timeout).map_err(|source| {
            ScanError::UserGrantFetch {
                user: user.to_string(),
                source,
            }
        })?;
        Ok(self.normalizer.fetch_user(&mut session, &principal)?)
    }
}

/// Reads the state captured by an earlier live run. Never queries.
pub struct CachedGrants<'a> {
    state: &'a CurrentState,
}

impl<'a> CachedGrants<'a> {
    pub fn new(state: &'a CurrentState) -> Self {
        Self { state }
    }
}

impl CurrentGrants for CachedGrants<'_> {
    fn role(&self, role: &str) -> Result<GrantSet, PlanError> {
        self.state
            .roles
            .get(role)
            .cloned()
            .ok_or_else(|| PlanError::MissingCurrentState {
                principal: Principal::Role,
                name: role.to_string(),
            })
    }

    fn user(&self, user: &str) -> Result<GrantSet, PlanError> {
        self.state
            .users
            .get(user)
            .cloned()
            .ok_or_else(|| PlanError::MissingCurrentState {
                principal: Principal::User,
                name: user.to_string(),
            })
    }
}
