// ── Deployment orchestrator ──
//
// Drives a full promotion/demotion run: domains → applications →
// brokers, one at a time. A failure while processing one application is
// caught at the application boundary; a transport failure against one
// broker abandons that broker's remaining work only. Save runs issue no
// broker calls at all.

use tracing::{error, info, warn};

use promesh_api::{PortalClient, SempClient, TransportConfig};

use crate::archive::PreviewArchive;
use crate::error::CoreError;
use crate::model::{
    ApplicationVersion, BrokerTarget, DeploymentAction, DeploymentPreview, ObjectKind, RunMode,
};
use crate::reconcile::{ObjectReconciler, ReconcileObserver};
use crate::resolve::{RunPlan, VersionResolution};

/// Counters for one run. Applications are counted once each; object and
/// broker failures accumulate across all of them.
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub object_failures: usize,
    pub broker_failures: usize,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.object_failures > 0 || self.broker_failures > 0
    }
}

/// Executes a resolved [`RunPlan`].
pub struct Deployer<'a> {
    portal: &'a PortalClient,
    transport: TransportConfig,
    archive: PreviewArchive,
    observer: &'a dyn ReconcileObserver,
}

impl<'a> Deployer<'a> {
    pub fn new(
        portal: &'a PortalClient,
        transport: TransportConfig,
        archive: PreviewArchive,
        observer: &'a dyn ReconcileObserver,
    ) -> Self {
        Self {
            portal,
            transport,
            archive,
            observer,
        }
    }

    /// Run every (domain, application, broker) combination in the plan.
    /// Never aborts on a per-application failure.
    pub async fn run(&self, plan: &RunPlan) -> RunSummary {
        info!(
            mode = %plan.mode,
            action = %plan.action,
            environment = %plan.environment_name,
            "starting run"
        );

        let mut summary = RunSummary::default();
        for domain in &plan.domains {
            for app in &domain.applications {
                match &app.resolution {
                    VersionResolution::Ineligible(version) => {
                        info!(
                            domain = %domain.name,
                            application = %app.name,
                            version = %version.version,
                            action = %plan.action,
                            "version not eligible, skipping"
                        );
                        summary.skipped += 1;
                    }
                    VersionResolution::Missing => {
                        let err = CoreError::MissingVersion {
                            domain: domain.name.clone(),
                            application: app.name.clone(),
                            version: app.version_label.clone(),
                        };
                        error!(
                            domain = %domain.name,
                            application = %app.name,
                            error = %err,
                            "configuration error"
                        );
                        summary.failed += 1;
                    }
                    VersionResolution::Unresolved(reason) => {
                        error!(
                            domain = %domain.name,
                            application = %app.name,
                            reason,
                            "could not resolve application"
                        );
                        summary.failed += 1;
                    }
                    VersionResolution::Eligible(version) => {
                        info!(
                            domain = %domain.name,
                            application = %app.name,
                            version = %version.version,
                            action = %plan.action,
                            "processing application"
                        );
                        match self
                            .process_application(plan, &domain.name, &app.name, version, &mut summary)
                            .await
                        {
                            Ok(()) => summary.completed += 1,
                            Err(err) => {
                                error!(
                                    domain = %domain.name,
                                    application = %app.name,
                                    version = %version.version,
                                    error = %err,
                                    "application processing failed"
                                );
                                summary.failed += 1;
                            }
                        }
                    }
                }
            }
        }

        info!(
            completed = summary.completed,
            skipped = summary.skipped,
            failed = summary.failed,
            object_failures = summary.object_failures,
            broker_failures = summary.broker_failures,
            "run finished"
        );
        summary
    }

    async fn process_application(
        &self,
        plan: &RunPlan,
        domain: &str,
        application: &str,
        version: &ApplicationVersion,
        summary: &mut RunSummary,
    ) -> Result<(), CoreError> {
        match plan.action {
            DeploymentAction::Save => {
                self.save_preview(plan, domain, application, version).await
            }
            DeploymentAction::Deploy | DeploymentAction::Undeploy => match plan.mode {
                RunMode::ConfigPush => self.config_push(plan, application, version, summary).await,
                RunMode::Semp => {
                    self.reconcile_brokers(plan, application, version, summary)
                        .await
                }
            },
        }
    }

    // ── save: archive the preview, touch no broker ───────────────────

    async fn save_preview(
        &self,
        plan: &RunPlan,
        domain: &str,
        application: &str,
        version: &ApplicationVersion,
    ) -> Result<(), CoreError> {
        let payload = self
            .portal
            .preview_deployment(
                &version.id,
                plan.action.preview_action(),
                &plan.preview_broker_id,
            )
            .await
            .map_err(CoreError::portal)?;

        self.archive.store(
            plan.tier,
            domain,
            application,
            &version.version,
            version.state,
            &payload,
        )?;
        Ok(())
    }

    // ── configPush: the portal executes, we drive ────────────────────

    async fn config_push(
        &self,
        plan: &RunPlan,
        application: &str,
        version: &ApplicationVersion,
        summary: &mut RunSummary,
    ) -> Result<(), CoreError> {
        for broker_id in &plan.target_broker_ids {
            info!(
                application,
                version = %version.version,
                broker = %broker_id,
                action = %plan.action,
                "pushing deployment via portal"
            );

            // Undeploy previews come from the source broker; the target
            // side no longer has the version to preview against.
            let preview_broker = if plan.action == DeploymentAction::Undeploy {
                &plan.preview_broker_id
            } else {
                broker_id
            };

            if let Err(err) = self
                .push_one(plan.action, version, preview_broker, broker_id)
                .await
            {
                summary.broker_failures += 1;
                error!(broker = %broker_id, error = %err, "portal push failed for broker");
            }
        }
        Ok(())
    }

    async fn push_one(
        &self,
        action: DeploymentAction,
        version: &ApplicationVersion,
        preview_broker: &str,
        target_broker: &str,
    ) -> Result<(), CoreError> {
        self.portal
            .preview_deployment(&version.id, action.preview_action(), preview_broker)
            .await
            .map_err(CoreError::portal)?;

        match self
            .portal
            .create_deployment(&version.id, &action.to_string(), target_broker)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_portal_conflict() => {
                info!(broker = %target_broker, "deployment already in requested state");
                Ok(())
            }
            Err(e) => Err(CoreError::portal(e)),
        }
    }

    // ── semp: reconcile each broker directly ─────────────────────────

    async fn reconcile_brokers(
        &self,
        plan: &RunPlan,
        application: &str,
        version: &ApplicationVersion,
        summary: &mut RunSummary,
    ) -> Result<(), CoreError> {
        let payload = self
            .portal
            .preview_deployment(
                &version.id,
                plan.action.preview_action(),
                &plan.preview_broker_id,
            )
            .await
            .map_err(CoreError::portal)?;
        let preview = DeploymentPreview::from_payload(payload)?;

        for target in &plan.brokers {
            info!(
                application,
                version = %version.version,
                broker = %target.name,
                action = %plan.action,
                "reconciling broker"
            );
            if let Err(err) = self
                .reconcile_one_broker(plan, &preview, target, summary)
                .await
            {
                summary.broker_failures += 1;
                error!(
                    broker = %target.name,
                    error = %err,
                    "broker abandoned for this application"
                );
            }
        }
        Ok(())
    }

    /// Apply or remove every requested object on one broker, in
    /// dependency order. Only transport-level errors escape; per-object
    /// failures are counted and the pass continues.
    async fn reconcile_one_broker(
        &self,
        plan: &RunPlan,
        preview: &DeploymentPreview,
        target: &BrokerTarget,
        summary: &mut RunSummary,
    ) -> Result<(), CoreError> {
        let semp = SempClient::new(
            &target.url,
            &target.msg_vpn,
            &target.username,
            target.password.clone(),
            &self.transport,
        )
        .map_err(|e| CoreError::BrokerTransport {
            broker: target.name.clone(),
            source: e,
        })?;
        let reconciler = ObjectReconciler::new(&target.name, &semp, self.observer);

        match plan.action {
            DeploymentAction::Deploy => {
                for kind in ObjectKind::DEPLOY_ORDER {
                    for spec in preview.requested_of_kind(kind) {
                        match reconciler.apply(spec).await {
                            Ok(_) => {}
                            Err(e) if e.is_broker_transport() => return Err(e),
                            Err(err) => {
                                warn!(error = %err, "continuing after object failure");
                                summary.object_failures += 1;
                            }
                        }
                    }
                }
            }
            DeploymentAction::Undeploy => {
                // Dependents before parents.
                for kind in ObjectKind::DEPLOY_ORDER.iter().rev() {
                    for spec in preview.requested_of_kind(*kind) {
                        match reconciler.remove(spec).await {
                            Ok(_) => {}
                            Err(e) if e.is_broker_transport() => return Err(e),
                            Err(err) => {
                                warn!(error = %err, "continuing after object failure");
                                summary.object_failures += 1;
                            }
                        }
                    }
                }
            }
            // Save never reaches broker reconciliation.
            DeploymentAction::Save => {}
        }
        Ok(())
    }
}
