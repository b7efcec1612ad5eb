// Connection and run-scope configuration types.
//
// Produced by promesh-config from the per-tier config files; consumed
// read-only across the whole run (no deployment unit owns them).

use secrecy::SecretString;

/// Connection identity for one physical broker.
#[derive(Debug, Clone)]
pub struct BrokerTarget {
    /// Display name used in logs and error context.
    pub name: String,
    /// Management API base URL, e.g. `https://broker:943/SEMP/v2/config`.
    pub url: String,
    /// VPN scope every object lives under.
    pub msg_vpn: String,
    pub username: String,
    pub password: SecretString,
}

/// One application entry in a domain's config: which version label to
/// promote.
#[derive(Debug, Clone)]
pub struct ApplicationConfig {
    pub name: String,
    pub version: String,
}

/// A design-time domain and the applications handled within it.
#[derive(Debug, Clone)]
pub struct DomainConfig {
    pub name: String,
    pub applications: Vec<ApplicationConfig>,
}

/// Everything a run needs to know about the target environment.
#[derive(Debug, Clone)]
pub struct TargetEnvironment {
    pub tier: super::EnvironmentTier,
    /// Portal name of the environment (resolved to an id at plan time).
    pub environment_name: String,
    /// Modeled event mesh within the environment.
    pub mesh_name: String,
    pub domains: Vec<DomainConfig>,
    /// Brokers to reconcile directly (semp mode).
    pub brokers: Vec<BrokerTarget>,
}

/// Where previews are taken from: the design-source environment (dev)
/// and its mesh.
#[derive(Debug, Clone)]
pub struct PreviewSource {
    pub environment_name: String,
    pub mesh_name: String,
}
