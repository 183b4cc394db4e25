//! Request counters for dispatcher observation.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Running request counters, updated by the dispatcher.
#[derive(Debug, Default)]
pub struct DispatchStats {
    dispatched: AtomicU64,
    completed: AtomicU64,
    faulted: AtomicU64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_faulted(&self) {
        self.faulted.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            faulted: self.faulted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of a dispatcher's request counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Requests handed to the worker.
    pub dispatched: u64,
    /// Requests that returned a result.
    pub completed: u64,
    /// Requests that ended in a fault or indeterminate outcome.
    pub faulted: u64,
}
