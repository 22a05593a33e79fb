//! `stackctl deploy`: render, pull, start and wait for the stack.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::deploy::{DeployOptions, DeployPorts, deploy};
use crate::application::services::health::WaitOptions;
use crate::commands::host_env;
use crate::infra::fs::LocalFs;

/// Arguments for the deploy command.
#[derive(Args)]
pub struct DeployArgs {
    /// Use images already present locally instead of pulling
    #[arg(long)]
    pub skip_pull: bool,
}

/// Run `stackctl deploy`.
///
/// # Errors
///
/// Returns the first error from any deployment step.
pub async fn run(app: &AppContext, args: &DeployArgs) -> Result<ExitCode> {
    let manifest = app.manifest()?;
    let secrets = app.secret_store(&manifest);
    let state = app.state_store(&manifest);
    let reporter = app.reporter();

    let outcome = deploy(
        &manifest,
        DeployPorts {
            runner: &app.runner,
            secrets: &secrets,
            writer: &LocalFs,
            state: &state,
        },
        DeployOptions {
            reporter: &reporter,
            host_env: &host_env,
            wait: WaitOptions::from(&manifest.health),
            skip_pull: args.skip_pull,
        },
    )
    .await?;

    app.renderer().render_deploy(&outcome)?;
    Ok(ExitCode::SUCCESS)
}
