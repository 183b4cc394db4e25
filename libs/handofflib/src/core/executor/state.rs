use serde::{Deserialize, Serialize};

/// State of a compute executor
///
/// Lifecycle states a worker moves through. Used by the executor loop
/// for gating and published through [`super::WorkerHandle`] for
/// external observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutorState {
    /// Spawned but not yet initialized; no shared memory touched
    Uninitialized,
    /// Initialized and waiting for a start instruction
    Ready,
    /// Running a request's kernel
    Busy,
    /// The last request's kernel failed; the next instruction proceeds
    /// as from `Ready`
    Faulted,
}

impl Default for ExecutorState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

impl std::fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Ready => write!(f, "Ready"),
            Self::Busy => write!(f, "Busy"),
            Self::Faulted => write!(f, "Faulted"),
        }
    }
}
