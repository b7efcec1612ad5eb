// Wire types for the event portal API.
//
// Field names mirror the portal's JSON exactly (camelCase); only the
// fields this tool consumes are modeled, everything else is ignored.

use serde::Deserialize;

/// Standard portal response envelope: payload under `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// An application domain (design-time grouping of applications).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDomain {
    pub id: String,
    pub name: String,
}

/// A declaratively-modeled application within a domain.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub application_domain_id: Option<String>,
}

/// One version of an application.
///
/// `state_id` is the lifecycle state as the portal serializes it: a
/// stringly-typed integer (`"1"` = draft … `"4"` = retired).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationVersion {
    pub id: String,
    pub version: String,
    pub state_id: String,
}

/// A runtime environment registered in the portal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: String,
    pub name: String,
}

/// A modeled event mesh within an environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMesh {
    pub id: String,
    pub name: String,
}

/// A messaging service (broker) attached to an event mesh.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingService {
    pub messaging_service_id: String,
    #[serde(default)]
    pub name: Option<String>,
}
