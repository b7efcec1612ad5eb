// ── Broker object reconciliation ──
//
// Makes one broker's object set match the desired specs, idempotently,
// whatever the broker's starting state. Probe-then-act per object,
// set reconciliation per child collection.

pub mod engine;
pub mod observer;

pub use engine::ObjectReconciler;
pub use observer::{ObjectOutcome, ReconcileObserver, TracingObserver};
