//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;
use crate::domain::error::{DeployError, EnvError, ManifestError, SecretError};
use crate::output::json::format_error;

/// Render and deploy a server stack from cloud secrets
#[derive(Parser)]
#[command(
    name = "stackctl",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Manifest path [default: ./stackctl.yaml]
    #[arg(short = 'f', long = "file", global = true, env = "STACKCTL_MANIFEST")]
    pub file: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render, pull, start and wait for the stack
    Deploy(commands::deploy::DeployArgs),

    /// Write the compose file and env file only
    Render,

    /// Pull the server, database and cache images
    Pull,

    /// Start the rendered stack
    Up,

    /// Wait until every service is healthy
    Health,

    /// Show service states and the last deployment
    Status,

    /// Stop and remove the stack
    Down(commands::down::DownArgs),

    /// Print the assembled environment
    Env(commands::env::EnvArgs),

    /// Validate or show the manifest
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

/// Stable machine-readable code for the JSON error object.
fn error_code(err: &anyhow::Error) -> &'static str {
    // Typed errors attached with `.context(..)` are only visible to downcast.
    if err.downcast_ref::<ManifestError>().is_some() {
        return "MANIFEST_ERROR";
    }
    if err.downcast_ref::<SecretError>().is_some() {
        return "SECRET_ERROR";
    }
    if err.downcast_ref::<EnvError>().is_some() {
        return "ENV_ERROR";
    }
    if err.downcast_ref::<DeployError>().is_some() {
        return "DEPLOY_ERROR";
    }
    for cause in err.chain() {
        if cause.is::<ManifestError>() {
            return "MANIFEST_ERROR";
        }
        if cause.is::<SecretError>() {
            return "SECRET_ERROR";
        }
        if cause.is::<EnvError>() {
            return "ENV_ERROR";
        }
        if cause.is::<DeployError>() {
            return "DEPLOY_ERROR";
        }
    }
    "ERROR"
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// Under `--json` a failure is printed as a JSON error object on stdout
    /// and mapped to exit code 1 here; otherwise it is returned to `main`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails in human output mode.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            file,
            yes,
            command,
        } = self;

        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags {
                yes,
                manifest: file,
            },
        });

        let result = match &command {
            Command::Deploy(args) => commands::deploy::run(&app, args).await,
            Command::Render => commands::render::run(&app).await,
            Command::Pull => commands::pull::run(&app).await,
            Command::Up => commands::up::run(&app).await,
            Command::Health => commands::health::run(&app).await,
            Command::Status => commands::status::run(&app).await,
            Command::Down(args) => commands::down::run(&app, args).await,
            Command::Env(args) => commands::env::run(&app, args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        };

        match result {
            Err(err) if app.is_json() => {
                tracing::debug!(error = ?err, "command failed");
                println!("{}", format_error(&format!("{err:#}"), error_code(&err))?);
                Ok(ExitCode::FAILURE)
            }
            other => other,
        }
    }
}
