// Plan resolution: turn configured names into portal ids and decide,
// per application, whether its version qualifies for the action.
//
// Run-scoped lookups (environment, mesh, domain) fail the resolution;
// application-scoped lookups record a per-application resolution so one
// application's problem never blocks its siblings.

use tracing::{debug, info};

use promesh_api::PortalClient;

use crate::eligibility::is_eligible;
use crate::error::CoreError;
use crate::model::{
    ApplicationVersion, BrokerTarget, DeploymentAction, DomainConfig, EnvironmentTier,
    PreviewSource, RunMode, TargetEnvironment, VersionState,
};

/// Per-application outcome of version resolution.
#[derive(Debug, Clone)]
pub enum VersionResolution {
    /// Version found and the gate passed.
    Eligible(ApplicationVersion),
    /// Version found but the gate rejects it for this tier/action.
    Ineligible(ApplicationVersion),
    /// The configured version label does not exist in the domain.
    Missing,
    /// The application (or its version state) could not be resolved.
    Unresolved(String),
}

#[derive(Debug, Clone)]
pub struct PlannedApplication {
    pub name: String,
    pub version_label: String,
    pub resolution: VersionResolution,
}

#[derive(Debug, Clone)]
pub struct PlannedDomain {
    pub name: String,
    pub id: String,
    pub applications: Vec<PlannedApplication>,
}

/// Everything the deployer needs for one run, fully resolved.
#[derive(Debug)]
pub struct RunPlan {
    pub mode: RunMode,
    pub action: DeploymentAction,
    pub tier: EnvironmentTier,
    pub environment_name: String,
    /// Broker the portal previews against (source side).
    pub preview_broker_id: String,
    /// Target-side portal broker ids (configPush execution).
    pub target_broker_ids: Vec<String>,
    pub domains: Vec<PlannedDomain>,
    /// Brokers reconciled directly (semp execution).
    pub brokers: Vec<BrokerTarget>,
}

/// Resolves configured names against the portal into a [`RunPlan`].
pub struct PlanResolver<'a> {
    portal: &'a PortalClient,
}

impl<'a> PlanResolver<'a> {
    pub fn new(portal: &'a PortalClient) -> Self {
        Self { portal }
    }

    pub async fn resolve(
        &self,
        mode: RunMode,
        action: DeploymentAction,
        target: &TargetEnvironment,
        preview_source: &PreviewSource,
        app_filter: Option<&[String]>,
    ) -> Result<RunPlan, CoreError> {
        let preview_broker_ids = self
            .broker_ids_for(
                &preview_source.environment_name,
                &preview_source.mesh_name,
            )
            .await?;
        let preview_broker_id = preview_broker_ids.first().cloned().ok_or_else(|| {
            CoreError::Configuration {
                message: format!(
                    "no messaging services found for preview environment '{}'",
                    preview_source.environment_name
                ),
            }
        })?;

        let target_broker_ids = self
            .broker_ids_for(&target.environment_name, &target.mesh_name)
            .await?;

        match mode {
            RunMode::ConfigPush if target_broker_ids.is_empty() => {
                return Err(CoreError::Configuration {
                    message: format!(
                        "no brokers found for target environment '{}'",
                        target.environment_name
                    ),
                });
            }
            RunMode::Semp if target.brokers.is_empty() => {
                return Err(CoreError::Configuration {
                    message: format!(
                        "no broker targets configured for environment '{}'",
                        target.environment_name
                    ),
                });
            }
            _ => {}
        }

        let mut domains = Vec::with_capacity(target.domains.len());
        for domain in &target.domains {
            domains.push(self.resolve_domain(domain, target.tier, action, app_filter).await?);
        }

        Ok(RunPlan {
            mode,
            action,
            tier: target.tier,
            environment_name: target.environment_name.clone(),
            preview_broker_id,
            target_broker_ids,
            domains,
            brokers: target.brokers.clone(),
        })
    }

    // ── Run-scoped lookups ───────────────────────────────────────────

    async fn broker_ids_for(
        &self,
        environment_name: &str,
        mesh_name: &str,
    ) -> Result<Vec<String>, CoreError> {
        let environments = self
            .portal
            .list_environments()
            .await
            .map_err(CoreError::portal)?;
        let environment = environments
            .iter()
            .find(|e| e.name == environment_name)
            .ok_or_else(|| CoreError::Configuration {
                message: format!("environment '{environment_name}' not found in portal"),
            })?;
        debug!(environment_name, id = %environment.id, "resolved environment");

        let meshes = self
            .portal
            .list_event_meshes(&environment.id)
            .await
            .map_err(CoreError::portal)?;
        let mesh = meshes
            .iter()
            .find(|m| m.name == mesh_name)
            .ok_or_else(|| CoreError::Configuration {
                message: format!(
                    "event mesh '{mesh_name}' not found in environment '{environment_name}'"
                ),
            })?;
        debug!(mesh_name, id = %mesh.id, "resolved event mesh");

        let services = self
            .portal
            .list_messaging_services(&mesh.id)
            .await
            .map_err(CoreError::portal)?;
        Ok(services
            .into_iter()
            .map(|s| s.messaging_service_id)
            .collect())
    }

    async fn resolve_domain(
        &self,
        domain: &DomainConfig,
        tier: EnvironmentTier,
        action: DeploymentAction,
        app_filter: Option<&[String]>,
    ) -> Result<PlannedDomain, CoreError> {
        let matches = self
            .portal
            .list_application_domains(Some(&domain.name))
            .await
            .map_err(CoreError::portal)?;
        let domain_id = matches
            .iter()
            .find(|d| d.name == domain.name)
            .map(|d| d.id.clone())
            .ok_or_else(|| CoreError::Configuration {
                message: format!("application domain '{}' not found in portal", domain.name),
            })?;
        debug!(domain = %domain.name, id = %domain_id, "resolved application domain");

        let mut applications = Vec::new();
        for app in &domain.applications {
            if let Some(filter) = app_filter {
                if !filter.iter().any(|f| f == &app.name) {
                    debug!(application = %app.name, "filtered out");
                    continue;
                }
            }

            let resolution = self
                .resolve_application(&domain_id, &app.name, &app.version, tier, action)
                .await;
            applications.push(PlannedApplication {
                name: app.name.clone(),
                version_label: app.version.clone(),
                resolution,
            });
        }

        Ok(PlannedDomain {
            name: domain.name.clone(),
            id: domain_id,
            applications,
        })
    }

    // ── Application-scoped lookups (isolated per application) ────────

    async fn resolve_application(
        &self,
        domain_id: &str,
        app_name: &str,
        version_label: &str,
        tier: EnvironmentTier,
        action: DeploymentAction,
    ) -> VersionResolution {
        let applications = match self.portal.list_applications(domain_id).await {
            Ok(apps) => apps,
            Err(e) => return VersionResolution::Unresolved(e.to_string()),
        };
        let Some(application) = applications.iter().find(|a| a.name == app_name) else {
            return VersionResolution::Unresolved(format!(
                "application '{app_name}' not found in domain"
            ));
        };

        let versions = match self
            .portal
            .list_application_versions(&application.id)
            .await
        {
            Ok(versions) => versions,
            Err(e) => return VersionResolution::Unresolved(e.to_string()),
        };
        let Some(version) = versions.iter().find(|v| v.version == version_label) else {
            return VersionResolution::Missing;
        };

        let Some(state) = VersionState::from_portal_id(&version.state_id) else {
            return VersionResolution::Unresolved(format!(
                "version '{version_label}' has unknown state id '{}'",
                version.state_id
            ));
        };

        let resolved = ApplicationVersion {
            id: version.id.clone(),
            version: version.version.clone(),
            state,
        };

        if is_eligible(tier, action, state) {
            VersionResolution::Eligible(resolved)
        } else {
            info!(
                application = app_name,
                version = version_label,
                %state,
                %tier,
                %action,
                "version not eligible, skipping"
            );
            VersionResolution::Ineligible(resolved)
        }
    }
}
