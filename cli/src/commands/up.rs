//! `stackctl up`: start the rendered stack detached.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::compose;
use crate::commands::require_rendered;

/// Run `stackctl up`.
///
/// # Errors
///
/// Returns an error if nothing has been rendered or `compose up` fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let manifest = app.manifest()?;
    require_rendered(&manifest)?;
    compose::up(&app.runner, &manifest, &app.reporter()).await?;
    app.renderer().render_action("up", &manifest.project)?;
    Ok(ExitCode::SUCCESS)
}
