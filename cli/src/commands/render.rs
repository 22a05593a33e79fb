//! `stackctl render`: write the compose file and env file, nothing else.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::render::{prepare_environment, render_artifacts};
use crate::commands::host_env;
use crate::infra::fs::LocalFs;

/// Run `stackctl render`.
///
/// # Errors
///
/// Returns an error if secrets cannot be fetched, the environment cannot be
/// assembled, or the files cannot be written.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let manifest = app.manifest()?;
    let secrets = app.secret_store(&manifest);
    let reporter = app.reporter();

    let env = prepare_environment(&manifest, &secrets, &reporter, &host_env).await?;
    let report = render_artifacts(&manifest, &env, &LocalFs, &reporter)?;

    app.renderer().render_rendered(&report)?;
    Ok(ExitCode::SUCCESS)
}
