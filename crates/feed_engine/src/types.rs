use std::fmt;

use feed_core::{DeltaToken, FailureKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    CycleCompleted {
        generation: u64,
        outcome: CycleOutcome,
    },
    DeltaCleared {
        token: DeltaToken,
    },
}

/// What a single fetch→dedupe→delta→store cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Synced {
        received: usize,
        kept: usize,
        delta: usize,
    },
    Failed(FailureKind),
    /// The result arrived after the scheduler was stopped and was dropped.
    Discarded,
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Synced {
                received,
                kept,
                delta,
            } => write!(f, "synced {kept} of {received} events (+{delta} new)"),
            CycleOutcome::Failed(kind) => write!(f, "failed: {kind}"),
            CycleOutcome::Discarded => write!(f, "discarded"),
        }
    }
}
