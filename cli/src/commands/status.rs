//! `stackctl status`: one-shot service states and the last deployment.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::status::stack_status;
use crate::commands::require_rendered;

/// Run `stackctl status`.
///
/// # Errors
///
/// Returns an error if `compose ps` fails or the state file is unreadable.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let manifest = app.manifest()?;
    require_rendered(&manifest)?;
    let status = stack_status(&app.runner, &manifest, &app.state_store(&manifest)).await?;
    app.renderer().render_status(&status)?;
    Ok(ExitCode::SUCCESS)
}
