//! Run configuration for the promesh tools.
//!
//! One JSON file per environment tier (`{dir}/{tier}.json`) naming the
//! portal environment, mesh, domains/applications, and broker targets,
//! plus `{dir}/portal.json` for the portal endpoint. Secrets resolve
//! env-var-first (`PROMESH_PORTAL_TOKEN`, per-broker `passwordEnv`),
//! then the file.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Format, Json},
};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use promesh_core::model::{
    ApplicationConfig, BrokerTarget, DomainConfig, EnvironmentTier, PreviewSource,
    TargetEnvironment,
};

/// Environment variable holding the portal bearer token.
pub const PORTAL_TOKEN_ENV: &str = "PROMESH_PORTAL_TOKEN";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "PROMESH_CONFIG_DIR";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    MissingFile { path: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for broker '{broker}' (set password or passwordEnv)")]
    NoCredentials { broker: String },

    #[error("no portal token configured (set {PORTAL_TOKEN_ENV} or 'token' in portal.json)")]
    NoToken,

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── File shapes ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortalFile {
    base_url: String,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TierFile {
    environment_name: String,
    mesh_name: String,
    #[serde(default)]
    domains: Vec<DomainEntry>,
    #[serde(default)]
    brokers: Vec<BrokerEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainEntry {
    name: String,
    #[serde(default)]
    applications: Vec<ApplicationEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationEntry {
    name: String,
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrokerEntry {
    name: String,
    url: String,
    msg_vpn_name: String,
    user: String,
    #[serde(default)]
    password: Option<String>,
    /// Environment variable to read the password from instead.
    #[serde(default)]
    password_env: Option<String>,
}

// ── Resolved portal settings ────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PortalSettings {
    pub base_url: String,
    pub token: SecretString,
}

// ── Config directory ────────────────────────────────────────────────

/// Resolve the config directory: `PROMESH_CONFIG_DIR`, then a local
/// `config/` directory, then the platform config dir.
pub fn default_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let local = PathBuf::from("config");
    if local.is_dir() {
        return local;
    }
    ProjectDirs::from("io", "promesh", "promesh")
        .map_or(local, |dirs| dirs.config_dir().to_path_buf())
}

// ── Loading ─────────────────────────────────────────────────────────

fn load_file<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::MissingFile {
            path: path.display().to_string(),
        });
    }
    let value: T = Figment::new().merge(Json::file(path)).extract()?;
    Ok(value)
}

/// Load `portal.json` and resolve the bearer token (env first).
pub fn load_portal(dir: &Path) -> Result<PortalSettings, ConfigError> {
    let file: PortalFile = load_file(&dir.join("portal.json"))?;

    if file.base_url.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "baseUrl".into(),
            reason: "must not be empty".into(),
        });
    }

    let token = std::env::var(PORTAL_TOKEN_ENV)
        .ok()
        .or(file.token)
        .filter(|t| !t.trim().is_empty())
        .ok_or(ConfigError::NoToken)?;

    Ok(PortalSettings {
        base_url: file.base_url,
        token: SecretString::from(token),
    })
}

/// Load `{tier}.json` into a validated [`TargetEnvironment`].
pub fn load_tier(dir: &Path, tier: EnvironmentTier) -> Result<TargetEnvironment, ConfigError> {
    let file: TierFile = load_file(&dir.join(format!("{tier}.json")))?;
    validate_tier(&file, tier)?;

    let brokers = file
        .brokers
        .into_iter()
        .map(resolve_broker)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TargetEnvironment {
        tier,
        environment_name: file.environment_name,
        mesh_name: file.mesh_name,
        domains: file
            .domains
            .into_iter()
            .map(|d| DomainConfig {
                name: d.name,
                applications: d
                    .applications
                    .into_iter()
                    .map(|a| ApplicationConfig {
                        name: a.name,
                        version: a.version,
                    })
                    .collect(),
            })
            .collect(),
        brokers,
    })
}

/// Previews are always taken against the dev-tier environment; read its
/// name and mesh from `dev.json`.
pub fn load_preview_source(dir: &Path) -> Result<PreviewSource, ConfigError> {
    let file: TierFile = load_file(&dir.join(format!("{}.json", EnvironmentTier::Dev)))?;
    Ok(PreviewSource {
        environment_name: file.environment_name,
        mesh_name: file.mesh_name,
    })
}

// ── Validation & credential resolution ──────────────────────────────

fn validate_tier(file: &TierFile, tier: EnvironmentTier) -> Result<(), ConfigError> {
    if file.environment_name.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: format!("{tier}.environmentName"),
            reason: "must not be empty".into(),
        });
    }
    if file.mesh_name.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: format!("{tier}.meshName"),
            reason: "must not be empty".into(),
        });
    }
    for domain in &file.domains {
        if domain.name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: format!("{tier}.domains.name"),
                reason: "must not be empty".into(),
            });
        }
        for app in &domain.applications {
            if app.name.trim().is_empty() || app.version.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("{tier}.domains['{}'].applications", domain.name),
                    reason: "application name and version must not be empty".into(),
                });
            }
        }
    }
    Ok(())
}

fn resolve_broker(entry: BrokerEntry) -> Result<BrokerTarget, ConfigError> {
    url::Url::parse(&entry.url).map_err(|e| ConfigError::Validation {
        field: format!("brokers['{}'].url", entry.name),
        reason: e.to_string(),
    })?;

    // Env var first, plaintext second.
    let password = entry
        .password_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
        .or(entry.password)
        .ok_or_else(|| ConfigError::NoCredentials {
            broker: entry.name.clone(),
        })?;

    Ok(BrokerTarget {
        name: entry.name,
        url: entry.url,
        msg_vpn: entry.msg_vpn_name,
        username: entry.user,
        password: SecretString::from(password),
    })
}

// ── Tests ───────────────────────────────────────────────────────────
