//! `stackctl health`: wait until every service reports healthy.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::health::{WaitOptions, wait_healthy};
use crate::commands::require_rendered;

/// Run `stackctl health`.
///
/// # Errors
///
/// Returns an error if a service exits, stays unhealthy, or the attempts
/// run out.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let manifest = app.manifest()?;
    require_rendered(&manifest)?;
    let report = wait_healthy(
        &app.runner,
        &manifest,
        WaitOptions::from(&manifest.health),
        &app.reporter(),
    )
    .await?;
    app.renderer().render_health(&report)?;
    Ok(ExitCode::SUCCESS)
}
