// Wire types for the broker management API.
//
// Record and field names mirror the management API's own schema
// (camelCase). Every primary record keeps unknown vendor attributes in a
// flattened `extra` map so a full-replace PUT round-trips them intact.

use serde::{Deserialize, Serialize};

/// Standard response envelope: payload under `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

// ── ACL profiles ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnAclProfile {
    pub acl_profile_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_vpn_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_connect_default_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_topic_default_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribe_topic_default_action: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnAclProfileClientConnectException {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl_profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_vpn_name: Option<String>,
    pub client_connect_exception_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnAclProfilePublishTopicException {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl_profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_vpn_name: Option<String>,
    pub publish_topic_exception: String,
    #[serde(default = "default_topic_syntax")]
    pub publish_topic_exception_syntax: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnAclProfileSubscribeTopicException {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl_profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_vpn_name: Option<String>,
    pub subscribe_topic_exception: String,
    #[serde(default = "default_topic_syntax")]
    pub subscribe_topic_exception_syntax: String,
}

fn default_topic_syntax() -> String {
    "smf".into()
}

// ── Client identities ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnClientUsername {
    pub client_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_vpn_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl_profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnClientCertificateUsername {
    pub certificate_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_vpn_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl_profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnAuthorizationGroup {
    pub authorization_group_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_vpn_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl_profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Queues ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnQueue {
    pub queue_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_vpn_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egress_enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnQueueSubscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_vpn_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
    pub subscription_topic: String,
}

// ── REST delivery points ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnRestDeliveryPoint {
    pub rest_delivery_point_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_vpn_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnRestDeliveryPointQueueBinding {
    pub queue_binding_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_vpn_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_delivery_point_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_request_target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_replace_target_authority_enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnRestDeliveryPointQueueBindingRequestHeader {
    pub header_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVpnRestDeliveryPointQueueBindingProtectedRequestHeader {
    pub header_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_value: Option<String>,
}
