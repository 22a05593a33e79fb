//! `stackctl pull`: pull the three images concurrently.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::images::pull_images;

/// Run `stackctl pull`.
///
/// # Errors
///
/// Returns the first pull failure.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let manifest = app.manifest()?;
    pull_images(&app.runner, &manifest, &app.reporter()).await?;
    app.renderer().render_action("pull", &manifest.project)?;
    Ok(ExitCode::SUCCESS)
}
