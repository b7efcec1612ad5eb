// Tagged broker-object specs.
//
// Each variant carries the primary configuration record (the wire type
// the management API accepts for create/replace) plus its named child
// collections. A spec is owned by exactly one deployment unit for the
// duration of a reconciliation pass.

use serde::Deserialize;
use strum::Display;

use promesh_api::semp::types::{
    MsgVpnAclProfile, MsgVpnAuthorizationGroup, MsgVpnClientCertificateUsername,
    MsgVpnClientUsername, MsgVpnQueue, MsgVpnRestDeliveryPoint,
    MsgVpnRestDeliveryPointQueueBinding, MsgVpnRestDeliveryPointQueueBindingProtectedRequestHeader,
    MsgVpnRestDeliveryPointQueueBindingRequestHeader,
};

/// The seven broker object kinds this tool manages, in no particular
/// order — see [`ObjectKind::DEPLOY_ORDER`] for the dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "camelCase")]
pub enum ObjectKind {
    AclProfile,
    ClientUsername,
    ClientCertificateUsername,
    AuthorizationGroup,
    Queue,
    RestDeliveryPoint,
    QueueBinding,
}

impl ObjectKind {
    /// Create order on deploy: parents before dependents. Undeploy
    /// iterates this in reverse so dependents go first.
    pub const DEPLOY_ORDER: [Self; 7] = [
        Self::AclProfile,
        Self::ClientUsername,
        Self::ClientCertificateUsername,
        Self::AuthorizationGroup,
        Self::Queue,
        Self::RestDeliveryPoint,
        Self::QueueBinding,
    ];
}

/// An ACL profile plus its three exception collections.
///
/// Exception entries are the exact topic/address strings the broker
/// keys them by; topic exceptions are created with SMF syntax.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclProfileSpec {
    pub acl_profile: MsgVpnAclProfile,
    #[serde(default)]
    pub client_connect_exceptions: Vec<String>,
    #[serde(default)]
    pub publish_topic_exceptions: Vec<String>,
    #[serde(default)]
    pub subscribe_topic_exceptions: Vec<String>,
}

/// A queue plus its topic subscriptions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSpec {
    pub queue_configuration: MsgVpnQueue,
    #[serde(default)]
    pub subscriptions: Vec<String>,
}

/// A REST-delivery-point queue binding plus its header collections.
/// The binding lives under its parent delivery point on the broker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueBindingSpec {
    pub rest_delivery_point_name: String,
    pub queue_binding: MsgVpnRestDeliveryPointQueueBinding,
    #[serde(default)]
    pub request_headers: Vec<MsgVpnRestDeliveryPointQueueBindingRequestHeader>,
    #[serde(default)]
    pub protected_request_headers: Vec<MsgVpnRestDeliveryPointQueueBindingProtectedRequestHeader>,
}

/// One desired broker object, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerObjectSpec {
    AclProfile(AclProfileSpec),
    /// At most one client identity per application per broker is the
    /// supported shape; extra entries still reconcile individually.
    ClientUsername(MsgVpnClientUsername),
    ClientCertificateUsername(MsgVpnClientCertificateUsername),
    AuthorizationGroup(MsgVpnAuthorizationGroup),
    Queue(QueueSpec),
    RestDeliveryPoint(MsgVpnRestDeliveryPoint),
    QueueBinding(QueueBindingSpec),
}

impl BrokerObjectSpec {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::AclProfile(_) => ObjectKind::AclProfile,
            Self::ClientUsername(_) => ObjectKind::ClientUsername,
            Self::ClientCertificateUsername(_) => ObjectKind::ClientCertificateUsername,
            Self::AuthorizationGroup(_) => ObjectKind::AuthorizationGroup,
            Self::Queue(_) => ObjectKind::Queue,
            Self::RestDeliveryPoint(_) => ObjectKind::RestDeliveryPoint,
            Self::QueueBinding(_) => ObjectKind::QueueBinding,
        }
    }

    /// The natural key the broker addresses this object by.
    pub fn key(&self) -> &str {
        match self {
            Self::AclProfile(spec) => &spec.acl_profile.acl_profile_name,
            Self::ClientUsername(u) => &u.client_username,
            Self::ClientCertificateUsername(u) => &u.certificate_username,
            Self::AuthorizationGroup(g) => &g.authorization_group_name,
            Self::Queue(spec) => &spec.queue_configuration.queue_name,
            Self::RestDeliveryPoint(r) => &r.rest_delivery_point_name,
            Self::QueueBinding(spec) => &spec.queue_binding.queue_binding_name,
        }
    }
}
