// Deployment preview: the desired-state snapshot for one
// (version, action, broker) triple.
//
// The portal's payload tags every entry with a `type` discriminator and
// puts the object under `value`; parsing turns that into the typed
// `BrokerObjectSpec` variants. The raw payload is kept verbatim for the
// archival sink.

use serde::Deserialize;
use tracing::debug;

use promesh_api::semp::types::{
    MsgVpnAuthorizationGroup, MsgVpnClientCertificateUsername, MsgVpnClientUsername,
    MsgVpnRestDeliveryPoint,
};

use super::objects::{AclProfileSpec, BrokerObjectSpec, ObjectKind, QueueBindingSpec, QueueSpec};
use crate::error::CoreError;

// ── Wire shape ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(tag = "type", content = "value")]
enum PreviewEntry {
    #[serde(rename = "solaceAcl")]
    Acl(AclProfileSpec),
    #[serde(rename = "solaceClientUsername")]
    ClientUsername(MsgVpnClientUsername),
    #[serde(rename = "solaceClientCertificateUsername")]
    ClientCertificateUsername(MsgVpnClientCertificateUsername),
    #[serde(rename = "solaceAuthorizationGroup")]
    AuthorizationGroup(MsgVpnAuthorizationGroup),
    #[serde(rename = "solaceQueue")]
    Queue(QueueSpec),
    #[serde(rename = "solaceRestDeliveryPoint")]
    RestDeliveryPoint(MsgVpnRestDeliveryPoint),
    #[serde(rename = "solaceQueueBinding")]
    QueueBinding(QueueBindingSpec),
    /// Object kinds this tool does not manage pass through untouched.
    #[serde(other)]
    Unmanaged,
}

impl PreviewEntry {
    fn into_spec(self) -> Option<BrokerObjectSpec> {
        match self {
            Self::Acl(s) => Some(BrokerObjectSpec::AclProfile(s)),
            Self::ClientUsername(u) => Some(BrokerObjectSpec::ClientUsername(u)),
            Self::ClientCertificateUsername(u) => {
                Some(BrokerObjectSpec::ClientCertificateUsername(u))
            }
            Self::AuthorizationGroup(g) => Some(BrokerObjectSpec::AuthorizationGroup(g)),
            Self::Queue(q) => Some(BrokerObjectSpec::Queue(q)),
            Self::RestDeliveryPoint(r) => Some(BrokerObjectSpec::RestDeliveryPoint(r)),
            Self::QueueBinding(b) => Some(BrokerObjectSpec::QueueBinding(b)),
            Self::Unmanaged => None,
        }
    }
}

// ── DeploymentPreview ───────────────────────────────────────────────

/// Immutable result of a preview request.
///
/// `requested` drives create/replace; deletions are decided against the
/// live broker, never against `existing`.
#[derive(Debug, Clone)]
pub struct DeploymentPreview {
    raw: serde_json::Value,
    requested: Vec<BrokerObjectSpec>,
    existing: Vec<BrokerObjectSpec>,
}

impl DeploymentPreview {
    /// Parse a raw portal preview payload.
    pub fn from_payload(raw: serde_json::Value) -> Result<Self, CoreError> {
        let data = raw.get("data").cloned().unwrap_or_default();
        let requested = Self::parse_partition(&data, "requested")?;
        let existing = Self::parse_partition(&data, "existing")?;

        Ok(Self {
            raw,
            requested,
            existing,
        })
    }

    fn parse_partition(
        data: &serde_json::Value,
        partition: &str,
    ) -> Result<Vec<BrokerObjectSpec>, CoreError> {
        let Some(entries) = data.get(partition) else {
            return Ok(Vec::new());
        };

        let entries: Vec<PreviewEntry> =
            serde_json::from_value(entries.clone()).map_err(|e| CoreError::PreviewShape {
                message: format!("malformed '{partition}' partition: {e}"),
            })?;

        let specs: Vec<BrokerObjectSpec> =
            entries.into_iter().filter_map(PreviewEntry::into_spec).collect();
        debug!(partition, count = specs.len(), "parsed preview partition");
        Ok(specs)
    }

    /// The verbatim payload, for archival.
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    pub fn requested(&self) -> &[BrokerObjectSpec] {
        &self.requested
    }

    pub fn existing(&self) -> &[BrokerObjectSpec] {
        &self.existing
    }

    /// Requested objects of one kind, preview order preserved.
    pub fn requested_of_kind(
        &self,
        kind: ObjectKind,
    ) -> impl Iterator<Item = &BrokerObjectSpec> {
        self.requested.iter().filter(move |s| s.kind() == kind)
    }
}
