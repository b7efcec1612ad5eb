//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use promesh_config::ConfigError;
use promesh_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const PORTAL: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("{message}")]
    #[diagnostic(
        code(promesh::usage),
        help("Run promesh --help for the accepted mode/target combinations.")
    )]
    Usage { message: String },

    #[error(transparent)]
    #[diagnostic(
        code(promesh::config),
        help("Config files live in the --config-dir directory (portal.json plus one file per tier).")
    )]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(code(promesh::core))]
    Core(#[from] CoreError),

    #[error(transparent)]
    #[diagnostic(code(promesh::api))]
    Api(#[from] promesh_api::Error),

    #[error(
        "run finished with failures: {failed} application(s), \
         {object_failures} object(s), {broker_failures} broker push(es)"
    )]
    #[diagnostic(
        code(promesh::run_failures),
        help("Each failure is logged with its domain/application/broker context above.")
    )]
    RunFailures {
        failed: usize,
        object_failures: usize,
        broker_failures: usize,
    },
}

impl CliError {
    /// Map this error to a process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. } => exit_code::USAGE,
            Self::Config(_) => exit_code::CONFIG,
            Self::Core(CoreError::Configuration { .. } | CoreError::MissingVersion { .. }) => {
                exit_code::CONFIG
            }
            Self::Core(CoreError::Portal { .. }) => exit_code::PORTAL,
            _ => exit_code::GENERAL,
        }
    }
}
