//! `stackctl down [--volumes]`: stop and remove the stack.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::compose;
use crate::commands::require_rendered;

/// Arguments for the down command.
#[derive(Args)]
pub struct DownArgs {
    /// Also remove the database and cache volumes (data loss)
    #[arg(long)]
    pub volumes: bool,
}

/// Run `stackctl down`.
///
/// The deployment record is left in place.
///
/// # Errors
///
/// Returns an error if `compose down` fails or the prompt cannot be shown.
pub async fn run(app: &AppContext, args: &DownArgs) -> Result<ExitCode> {
    let manifest = app.manifest()?;
    require_rendered(&manifest)?;

    if args.volumes && !app.non_interactive {
        let prompt = format!(
            "Remove volumes of project {}? Database and cache data will be lost",
            manifest.project
        );
        if !app.confirm(&prompt, false)? {
            app.renderer().render_cancelled("down", &manifest.project)?;
            return Ok(ExitCode::SUCCESS);
        }
    }

    compose::down(&app.runner, &manifest, args.volumes, &app.reporter()).await?;
    app.renderer().render_action("down", &manifest.project)?;
    Ok(ExitCode::SUCCESS)
}
