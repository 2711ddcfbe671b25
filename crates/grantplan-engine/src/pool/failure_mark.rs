//! Lowest failing unit index, shared across workers.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Tracks the lowest unit index that has failed so far.
///
/// Under fail-fast, a unit whose index is above the mark is skipped. Units
/// below the mark always run, so the first failure in unit order is found
/// no matter how workers interleave.
#[derive(Debug)]
pub struct FailureMark {
    lowest: AtomicUsize,
}

impl FailureMark {
    pub fn new() -> Self {
        Self {
            lowest: AtomicUsize::new(usize::MAX),
        }
    }

    /// Record that the unit at `index` failed.
    pub fn record(&self, index: usize) {
        self.lowest.fetch_min(index, Ordering::SeqCst);
    }

    /// Whether a unit at `index` comes after a known failure.
    pub fn is_after_failure(&self, index: usize) -> bool {
        index > self.lowest.load(Ordering::SeqCst)
    }

    /// The lowest failing index, if any.
    pub fn lowest(&self) -> Option<usize> {
        match self.lowest.load(Ordering::SeqCst) {
            usize::MAX => None,
            index => Some(index),
        }
    }
}

impl Default for FailureMark {
    fn default() -> Self {
        Self::new()
    }
}
