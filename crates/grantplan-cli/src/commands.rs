//! `plan` and `print-plan`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use grantplan_core::access::AccessConfig;
use grantplan_core::config::{CliOverrides, FailurePolicy, GrantplanConfig, ScanMode};
use grantplan_core::errors::{PlanError, StorageError};
use grantplan_core::types::{CurrentState, Snapshot};
use grantplan_core::PrivilegeTables;
use grantplan_engine::{PlanRequest, Planner, RunContext, SnapshotSource};
use grantplan_storage::{merge_current, AccountPaths, GrantCache, PlanStore};

use crate::args::{Cli, Command, PlanArgs, PrintPlanArgs};
use crate::render::{render_failures, render_plan};
use crate::replay::ReplayTransport;

/// What a command produced, for the caller to print.
#[derive(Debug, Default)]
pub struct Report {
    /// For stdout.
    pub output: String,
    /// Failed units, for stderr.
    pub warnings: String,
    pub failed_units: usize,
}

/// Run one parsed command. `root` is where `grantplan.toml` is looked up.
pub fn run(cli: Cli, root: &Path) -> Result<Report, PlanError> {
    let overrides = CliOverrides {
        state_dir: cli.state_dir,
        query_timeout_secs: cli.query_timeout,
        ..Default::default()
    };
    match cli.command {
        Command::Plan(args) => plan(root, overrides, &args),
        Command::PrintPlan(args) => print_plan(root, overrides, &args),
    }
}

fn plan(root: &Path, mut overrides: CliOverrides, args: &PlanArgs) -> Result<Report, PlanError> {
    if args.sequential {
        overrides.mode = Some(ScanMode::Sequential);
    }
    if args.fail_fast {
        overrides.failure_policy = Some(FailurePolicy::FailFast);
    }
    let config = GrantplanConfig::load(root, Some(&overrides))?;
    let paths = AccountPaths::new(&config.storage.effective_state_dir(), &args.account);
    let access = AccessConfig::load(&paths.access_file())?;
    let tables = PrivilegeTables::load_with_overrides(&paths.tables_file())?;

    let request = PlanRequest {
        roles: (!args.roles.is_empty()).then(|| args.roles.clone()),
        plan_users: args.users,
    };
    let planner = Planner::new(&config, &tables, &access);
    let cache = GrantCache::new(&paths);
    let ctx = RunContext::now();

    let run = match (&args.replay, args.rescan) {
        (Some(recording), true) => {
            let transport = Arc::new(ReplayTransport::load(recording)?);
            planner.plan(SnapshotSource::Live(transport), &request, ctx)?
        }
        _ => {
            let cached = cache.load()?;
            tracing::info!(
                account = %args.account,
                cached_at = %cached.cached_at,
                "planning from cache"
            );
            planner.plan(SnapshotSource::Cached(cached.snapshot), &request, ctx)?
        }
    };

    if let Some(refreshed) = run.refreshed {
        let snapshot = Snapshot {
            current: merge_current(previous_state(&cache), refreshed.current),
            catalog: refreshed.catalog,
        };
        cache.store(&snapshot, Local::now())?;
    }
    PlanStore::new(&paths).append(&run.outcome.plan)?;

    Ok(Report {
        output: render_plan(&run.outcome.plan, args.verbose),
        warnings: render_failures(&run.outcome.failures),
        failed_units: run.outcome.failures.len(),
    })
}

/// Current state captured by earlier runs, kept for principals this run skips.
fn previous_state(cache: &GrantCache) -> CurrentState {
    match cache.load() {
        Ok(cached) => cached.snapshot.current,
        Err(StorageError::CacheNotFound { .. }) => CurrentState::default(),
        Err(e) => {
            tracing::warn!(error = %e, "previous cache is unreadable and will be replaced");
            CurrentState::default()
        }
    }
}

fn print_plan(
    root: &Path,
    overrides: CliOverrides,
    args: &PrintPlanArgs,
) -> Result<Report, PlanError> {
    let config = GrantplanConfig::load(root, Some(&overrides))?;
    let paths = AccountPaths::new(&config.storage.effective_state_dir(), &args.account);
    let plan = PlanStore::new(&paths).latest()?;
    Ok(Report {
        output: render_plan(&plan, args.verbose),
        ..Default::default()
    })
}

/// The working directory, or `.` when it cannot be read.
pub fn project_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to get current directory, using '.'");
        PathBuf::from(".")
    })
}
