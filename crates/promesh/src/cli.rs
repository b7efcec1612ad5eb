//! Clap derive structures for the `promesh` CLI.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use promesh_core::model::{DeploymentAction, EnvironmentTier, RunMode};

/// promesh -- promote event-broker application configurations
#[derive(Debug, Parser)]
#[command(
    name = "promesh",
    version,
    about = "Promote declaratively-modeled messaging configurations onto broker clusters",
    long_about = "Takes application versions modeled in the event portal and converges\n\
        target brokers to match them: deploy, undeploy, or save the preview.\n\n\
        Modes: configPush lets the portal execute the deployment; semp talks to\n\
        each broker's management API directly.",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Deployment mode
    #[arg(long, value_enum)]
    pub mode: ModeArg,

    /// Target environment tier to execute the action on
    #[arg(long, value_enum)]
    pub target: TierArg,

    /// Action to perform on each eligible application version
    #[arg(long, value_enum, default_value = "deploy")]
    pub action: ActionArg,

    /// Comma-separated application names to restrict the run to
    #[arg(long = "apps", value_delimiter = ',')]
    pub apps: Option<Vec<String>>,

    /// Directory holding portal.json and {tier}.json config files
    #[arg(long, env = "PROMESH_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory previews are archived under (--action save)
    #[arg(long, default_value = "previews")]
    pub archive_dir: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k')]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,
}

// ── Value enums (CLI spellings of the core enums) ────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// The portal executes the deployment
    #[value(name = "configPush", alias = "config-push")]
    ConfigPush,
    /// Reconcile each broker's management API directly
    #[value(name = "semp")]
    Semp,
}

impl From<ModeArg> for RunMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::ConfigPush => RunMode::ConfigPush,
            ModeArg::Semp => RunMode::Semp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
    Dev,
    Tst,
    Acc,
    Prd,
}

impl From<TierArg> for EnvironmentTier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Dev => EnvironmentTier::Dev,
            TierArg::Tst => EnvironmentTier::Tst,
            TierArg::Acc => EnvironmentTier::Acc,
            TierArg::Prd => EnvironmentTier::Prd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    Deploy,
    Undeploy,
    /// Persist the preview without touching any broker
    Save,
}

impl From<ActionArg> for DeploymentAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Deploy => DeploymentAction::Deploy,
            ActionArg::Undeploy => DeploymentAction::Undeploy,
            ActionArg::Save => DeploymentAction::Save,
        }
    }
}
