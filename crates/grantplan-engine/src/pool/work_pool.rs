//! Sequential or rayon-backed execution of independent units.
//!
//! Units never share mutable state. Each returns its own result, and results
//! are merged in unit order after every unit has settled, so both modes
//! produce the same outcome for the same inputs.

use std::time::Instant;

use grantplan_core::config::{FailurePolicy, ScanConfig, ScanMode};
use grantplan_core::errors::PlanError;
use rayon::prelude::*;

use super::FailureMark;

/// How units are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    /// Bounded worker pool. `threads == 0` lets rayon pick.
    Concurrent { threads: usize },
}

impl ExecutionMode {
    pub fn from_config(scan: &ScanConfig) -> Self {
        match scan.effective_mode() {
            ScanMode::Sequential => Self::Sequential,
            ScanMode::Concurrent => Self::Concurrent {
                threads: scan.effective_threads(),
            },
        }
    }
}

/// Settled units, in unit order.
#[derive(Debug)]
pub struct PoolOutcome<K, T, E> {
    pub succeeded: Vec<(K, T)>,
    /// Under fail-fast this holds exactly the first failing unit.
    pub failed: Vec<(K, E)>,
}

impl<K, T, E> PoolOutcome<K, T, E> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs units of work under one execution mode and failure policy.
pub struct WorkPool {
    mode: ExecutionMode,
    policy: FailurePolicy,
    pool: Option<rayon::ThreadPool>,
}

impl WorkPool {
    pub fn new(mode: ExecutionMode, policy: FailurePolicy) -> Result<Self, PlanError> {
        let pool = match mode {
            ExecutionMode::Sequential => None,
            ExecutionMode::Concurrent { threads } => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("grantplan-worker-{i}"))
                    .build()
                    .map_err(|e| PlanError::Pool { message: e.to_string() })?,
            ),
        };
        Ok(Self { mode, policy, pool })
    }

    pub fn sequential(policy: FailurePolicy) -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            policy,
            pool: None,
        }
    }

    pub fn from_config(scan: &ScanConfig) -> Result<Self, PlanError> {
        Self::new(ExecutionMode::from_config(scan), scan.effective_failure_policy())
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run `work` once per unit and merge the settled results in unit order.
    pub fn run<K, T, E, F>(&self, phase: &str, units: Vec<K>, work: F) -> PoolOutcome<K, T, E>
    where
        K: Send,
        T: Send,
        E: Send,
        F: Fn(&K) -> Result<T, E> + Sync,
    {
        let started = Instant::now();
        let total = units.len();
        let fail_fast = self.policy == FailurePolicy::FailFast;
        let mark = FailureMark::new();

        let run_one = |index: usize, unit: K| -> (K, Option<Result<T, E>>) {
            if fail_fast && mark.is_after_failure(index) {
                return (unit, None);
            }
            let result = work(&unit);
            if fail_fast && result.is_err() {
                mark.record(index);
            }
            (unit, Some(result))
        };

        let settled: Vec<(K, Option<Result<T, E>>)> = match &self.pool {
            None => units
                .into_iter()
                .enumerate()
                .map(|(index, unit)| run_one(index, unit))
                .collect(),
            Some(pool) => pool.install(|| {
                units
                    .into_par_iter()
                    .enumerate()
                    .map(|(index, unit)| run_one(index, unit))
                    .collect()
            }),
        };

        let mut outcome = PoolOutcome {
            succeeded: Vec::with_capacity(total),
            failed: Vec::new(),
        };
        let mut skipped = 0usize;
        for (unit, result) in settled {
            match result {
                Some(Ok(value)) => outcome.succeeded.push((unit, value)),
                Some(Err(error)) => {
                    outcome.failed.push((unit, error));
                    if fail_fast {
                        break;
                    }
                }
                None => skipped += 1,
            }
        }

        tracing::debug!(
            phase,
            mode = ?self.mode,
            units = total,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "work pool phase finished"
        );
        outcome
    }
}

impl std::fmt::Debug for WorkPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkPool")
            .field("mode", &self.mode)
            .field("policy", &self.policy)
            .finish()
    }
}
