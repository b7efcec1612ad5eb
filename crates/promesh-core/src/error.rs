// ── Core error taxonomy ──
//
// Each variant maps to one isolation boundary in the orchestrator:
// Configuration / MissingVersion / Portal end one application's
// processing, BrokerTransport ends one broker's remaining work for the
// current application, ObjectFailed ends only the object it names.

use thiserror::Error;

use crate::model::ObjectKind;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration ────────────────────────────────────────────────
    /// Malformed or incomplete run configuration.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The application's target version does not exist in its domain.
    /// Reported before any broker call for that application.
    #[error(
        "Application '{application}' version '{version}' does not exist in domain '{domain}'"
    )]
    MissingVersion {
        domain: String,
        application: String,
        version: String,
    },

    // ── Remote surfaces ──────────────────────────────────────────────
    /// The preview provider (portal) call failed non-recoverably.
    #[error("Portal error: {message}")]
    Portal {
        message: String,
        code: Option<i64>,
    },

    /// One broker object could not be reconciled; siblings continue.
    #[error("Failed to reconcile {kind} '{key}': {source}")]
    ObjectFailed {
        kind: ObjectKind,
        key: String,
        #[source]
        source: promesh_api::Error,
    },

    /// The broker itself is unreachable or answered garbage; the rest
    /// of this broker's work for the current application is abandoned.
    #[error("Broker '{broker}' transport failure: {source}")]
    BrokerTransport {
        broker: String,
        #[source]
        source: promesh_api::Error,
    },

    // ── Local surfaces ───────────────────────────────────────────────
    /// The preview payload did not have the expected shape.
    #[error("Preview payload error: {message}")]
    PreviewShape { message: String },

    /// Writing a preview to the archive failed.
    #[error("Failed to archive preview at {path}: {source}")]
    Archive {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    /// Build the portal-failure variant from an api-level error.
    pub fn portal(err: promesh_api::Error) -> Self {
        let code = match &err {
            promesh_api::Error::Portal { code, .. } => *code,
            _ => None,
        };
        Self::Portal {
            message: err.to_string(),
            code,
        }
    }

    /// `true` when this error must end the current broker's remaining
    /// work (but not the run).
    pub fn is_broker_transport(&self) -> bool {
        matches!(self, Self::BrokerTransport { .. })
    }
}
