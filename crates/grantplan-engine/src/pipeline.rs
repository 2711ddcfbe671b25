//! End-to-end planning: validate, build or load the catalog, plan every
//! selected principal.

use std::sync::Arc;
use std::time::Instant;

use grantplan_core::access::AccessConfig;
use grantplan_core::config::GrantplanConfig;
use grantplan_core::errors::PlanError;
use grantplan_core::traits::SessionFactory;
use grantplan_core::types::{ObjectCatalog, ObjectType, Snapshot};
use grantplan_core::PrivilegeTables;

use crate::catalog::{classify, CatalogBuilder, IgnoreSet, TransientPattern};
use crate::expand::ProfileExpander;
use crate::grants::GrantNormalizer;
use crate::plan::{
    CachedGrants, CurrentGrants, LiveGrants, PlanAssembler, PlanOutcome, RunContext,
};
use crate::pool::WorkPool;

/// Where the catalog and current grants come from.
pub enum SnapshotSource {
    /// Inventory and fetch from the remote system.
    Live(Arc<dyn SessionFactory>),
    /// Use a snapshot captured by an earlier live run.
    Cached(Snapshot),
}

/// What to plan.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    /// Roles to plan; `None` plans every configured role.
    pub roles: Option<Vec<String>>,
    /// Also plan role membership for every configured user.
    pub plan_users: bool,
}

/// A finished run.
#[derive(Debug)]
pub struct PlanRun {
    pub outcome: PlanOutcome,
    /// The classified catalog and the current state the run observed.
    /// Only live runs produce one; it is what the cache should hold next.
    pub refreshed: Option<Snapshot>,
}

pub struct Planner<'a> {
    config: &'a GrantplanConfig,
    tables: &'a PrivilegeTables,
    access: &'a AccessConfig,
}

impl<'a> Planner<'a> {
    pub fn new(
        config: &'a GrantplanConfig,
        tables: &'a PrivilegeTables,
        access: &'a AccessConfig,
    ) -> Self {
        Self { config, tables, access }
    }

    pub fn plan(
        &self,
        source: SnapshotSource,
        request: &PlanRequest,
        ctx: RunContext,
    ) -> Result<PlanRun, PlanError> {
        let started = Instant::now();
        self.access.validate(self.tables)?;
        let roles = self.access.select_roles(request.roles.as_deref())?;
        let users: Vec<String> = if request.plan_users {
            self.access.users.keys().cloned().collect()
        } else {
            Vec::new()
        };
        let pool = WorkPool::from_config(&self.config.scan)?;
        let timeout = self.config.scan.effective_query_timeout();

        tracing::info!(
            roles = roles.len(),
            users = users.len(),
            mode = ?pool.mode(),
            policy = %pool.policy(),
            "planning started"
        );

        let run = match source {
            SnapshotSource::Live(factory) => {
                let catalog = self.build_catalog(Arc::clone(&factory), &pool)?;
                let normalizer = GrantNormalizer::new(self.tables, &catalog);
                let live = LiveGrants::new(factory, timeout, normalizer);
                let outcome = self.assemble(&pool, &catalog, &live, ctx, &roles, &users)?;
                let refreshed = Snapshot {
                    catalog,
                    current: outcome.observed.clone(),
                };
                PlanRun {
                    outcome,
                    refreshed: Some(refreshed),
                }
            }
            SnapshotSource::Cached(snapshot) => {
                let cached = CachedGrants::new(&snapshot.current);
                let outcome =
                    self.assemble(&pool, &snapshot.catalog, &cached, ctx, &roles, &users)?;
                PlanRun {
                    outcome,
                    refreshed: None,
                }
            }
        };

        tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "planning finished");
        Ok(run)
    }

    /// Inventory and classify. Any failed object type aborts planning: a
    /// partial catalog would turn valid grants into revocations.
    pub fn build_catalog(
        &self,
        factory: Arc<dyn SessionFactory>,
        pool: &WorkPool,
    ) -> Result<ObjectCatalog, PlanError> {
        let scan = &self.config.scan;
        let ignore = IgnoreSet::new(&scan.ignore_objects)?;
        let transient = TransientPattern::new(scan.effective_transient_pattern())?;
        let builder = CatalogBuilder::new(factory, pool, scan.effective_query_timeout(), &ignore);
        let (raw, failures) = builder.build(ObjectType::SCANNED);
        if !failures.is_empty() {
            return Err(PlanError::IncompleteCatalog { failures });
        }
        Ok(classify(raw, &transient))
    }

    fn assemble(
        &self,
        pool: &WorkPool,
        catalog: &ObjectCatalog,
        current: &dyn CurrentGrants,
        ctx: RunContext,
        roles: &[String],
        users: &[String],
    ) -> Result<PlanOutcome, PlanError> {
        let expander = ProfileExpander::new(catalog, self.tables);
        PlanAssembler::new(pool, expander, current).assemble(ctx, self.access, roles, users)
    }
}
