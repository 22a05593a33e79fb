//! `stackctl env [--show-secrets]`: print the assembled environment.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::render::prepare_environment;
use crate::commands::host_env;

/// Arguments for the env command.
#[derive(Args)]
pub struct EnvArgs {
    /// Print secret-derived values instead of redacting them
    #[arg(long)]
    pub show_secrets: bool,
}

/// Run `stackctl env`.
///
/// # Errors
///
/// Returns an error if secrets cannot be fetched or the environment cannot
/// be assembled.
pub async fn run(app: &AppContext, args: &EnvArgs) -> Result<ExitCode> {
    let manifest = app.manifest()?;
    let secrets = app.secret_store(&manifest);
    let env = prepare_environment(&manifest, &secrets, &app.reporter(), &host_env).await?;
    if args.show_secrets {
        tracing::warn!(secrets = env.secret_count(), "printing secret values");
    }
    app.renderer().render_env(&env, args.show_secrets)?;
    Ok(ExitCode::SUCCESS)
}
