// Structured reconciliation events.
//
// The engine reports every object it touches through this interface
// instead of logging directly, so outcomes are observable without
// parsing log text.

use tracing::{debug, error, info};

use crate::model::ObjectKind;

/// What happened to one broker object during a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectOutcome {
    /// Object was absent and has been created.
    Created,
    /// Object was present and has been replaced with the desired config.
    Updated,
    /// Object has been deleted.
    Removed,
    /// Create raced an existing object; treated as success.
    AlreadyExists,
    /// Delete hit an absent object; treated as success.
    AlreadyAbsent,
    /// The broker rejected the object; siblings continue.
    Failed(String),
}

impl ObjectOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Recovered conflicts: the operation was redundant, not wrong.
    pub fn is_recovered_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists | Self::AlreadyAbsent)
    }
}

/// Sink for per-object reconciliation events.
pub trait ReconcileObserver: Send + Sync {
    fn on_object_reconciled(&self, kind: ObjectKind, key: &str, outcome: &ObjectOutcome);
}

/// Default observer: one tracing event per object, severity by outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ReconcileObserver for TracingObserver {
    fn on_object_reconciled(&self, kind: ObjectKind, key: &str, outcome: &ObjectOutcome) {
        match outcome {
            ObjectOutcome::Created | ObjectOutcome::Updated | ObjectOutcome::Removed => {
                info!(%kind, key, ?outcome, "object reconciled");
            }
            ObjectOutcome::AlreadyExists | ObjectOutcome::AlreadyAbsent => {
                debug!(%kind, key, ?outcome, "object already converged");
            }
            ObjectOutcome::Failed(reason) => {
                error!(%kind, key, reason, "object reconciliation failed");
            }
        }
    }
}
