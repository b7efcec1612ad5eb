mod cli;
mod error;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use promesh_api::transport::{TlsMode, TransportConfig};
use promesh_api::PortalClient;
use promesh_core::model::{DeploymentAction, EnvironmentTier, RunMode};
use promesh_core::reconcile::TracingObserver;
use promesh_core::{Deployer, PlanResolver, PreviewArchive};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mode: RunMode = cli.mode.into();
    let tier: EnvironmentTier = cli.target.into();
    let action: DeploymentAction = cli.action.into();

    // Dev is pushed from the portal UI, never from this tool.
    if mode == RunMode::ConfigPush && tier == EnvironmentTier::Dev {
        return Err(CliError::Usage {
            message: "configPush cannot target the dev tier; use config push via the portal"
                .into(),
        });
    }

    let config_dir = cli
        .config_dir
        .unwrap_or_else(promesh_config::default_config_dir);
    tracing::debug!(config_dir = %config_dir.display(), "loading configuration");

    let portal_settings = promesh_config::load_portal(&config_dir)?;
    let target = promesh_config::load_tier(&config_dir, tier)?;
    let preview_source = promesh_config::load_preview_source(&config_dir)?;

    let transport = TransportConfig {
        tls: if cli.insecure {
            TlsMode::DangerAcceptInvalid
        } else {
            TlsMode::System
        },
        timeout: Duration::from_secs(cli.timeout),
    };
    let portal = PortalClient::from_token(
        &portal_settings.base_url,
        &portal_settings.token,
        &transport,
    )?;

    tracing::info!(
        %mode,
        %action,
        %tier,
        environment = %target.environment_name,
        "running promesh"
    );

    let resolver = PlanResolver::new(&portal);
    let plan = resolver
        .resolve(mode, action, &target, &preview_source, cli.apps.as_deref())
        .await?;

    let observer = TracingObserver;
    let archive = PreviewArchive::new(&cli.archive_dir);
    let deployer = Deployer::new(&portal, transport, archive, &observer);
    let summary = deployer.run(&plan).await;

    if summary.has_failures() {
        return Err(CliError::RunFailures {
            failed: summary.failed,
            object_failures: summary.object_failures,
            broker_failures: summary.broker_failures,
        });
    }
    Ok(())
}
