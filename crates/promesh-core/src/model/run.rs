// Run-level enums and the application-version record.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Ordered environment tiers a run can target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentTier {
    Dev,
    Tst,
    Acc,
    Prd,
}

impl EnvironmentTier {
    /// Dev and test share the permissive eligibility rules; acceptance
    /// and production share the restrictive ones.
    pub fn is_pre_production(self) -> bool {
        matches!(self, Self::Dev | Self::Tst)
    }
}

/// What a run does with each qualifying application version.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeploymentAction {
    Deploy,
    Undeploy,
    /// Persist the preview without touching any broker.
    Save,
}

impl DeploymentAction {
    /// The action string sent on preview requests. Previews always
    /// describe the deploy-shaped object set, whatever the run does
    /// with it.
    pub fn preview_action(self) -> &'static str {
        "deploy"
    }
}

/// How the run executes: portal-side push or direct broker management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum RunMode {
    #[strum(serialize = "configPush")]
    #[serde(rename = "configPush")]
    ConfigPush,
    #[strum(serialize = "semp")]
    #[serde(rename = "semp")]
    Semp,
}

/// Lifecycle state of an application version, as numbered by the
/// portal (`1` = draft … `4` = retired).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum VersionState {
    Draft = 1,
    Released = 2,
    Deprecated = 3,
    Retired = 4,
}

impl VersionState {
    /// Parse the portal's stringly-typed state id.
    pub fn from_portal_id(id: &str) -> Option<Self> {
        match id.trim() {
            "1" => Some(Self::Draft),
            "2" => Some(Self::Released),
            "3" => Some(Self::Deprecated),
            "4" => Some(Self::Retired),
            _ => None,
        }
    }
}

/// A resolved application version: portal id, human label, lifecycle
/// state. Immutable once created; state advances portal-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationVersion {
    pub id: String,
    pub version: String,
    pub state: VersionState,
}
