// ── Domain model ──
//
// Canonical types for a promotion run: lifecycle enums, broker targets,
// the tagged broker-object specs, and the parsed deployment preview.

pub mod objects;
pub mod preview;
pub mod run;
pub mod target;

// ── Re-exports ──────────────────────────────────────────────────────

pub use run::{ApplicationVersion, DeploymentAction, EnvironmentTier, RunMode, VersionState};

pub use target::{
    ApplicationConfig, BrokerTarget, DomainConfig, PreviewSource, TargetEnvironment,
};

pub use objects::{AclProfileSpec, BrokerObjectSpec, ObjectKind, QueueBindingSpec, QueueSpec};

pub use preview::DeploymentPreview;
