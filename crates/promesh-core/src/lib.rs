// promesh-core: domain model, reconciliation engine, and run orchestration.

pub mod archive;
pub mod deploy;
pub mod eligibility;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod resolve;

// ── Primary re-exports ──────────────────────────────────────────────
pub use archive::PreviewArchive;
pub use deploy::{Deployer, RunSummary};
pub use eligibility::is_eligible;
pub use error::CoreError;
pub use reconcile::{ObjectOutcome, ObjectReconciler, ReconcileObserver, TracingObserver};
pub use resolve::{PlanResolver, RunPlan};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ApplicationConfig, ApplicationVersion, BrokerObjectSpec, BrokerTarget, DeploymentAction,
    DeploymentPreview, DomainConfig, EnvironmentTier, ObjectKind, PreviewSource, RunMode,
    TargetEnvironment, VersionState,
};
