//! `stackctl config`: validate and show the manifest.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Load and validate the manifest
    Validate,
    /// Print the effective manifest (defaults filled in)
    Show,
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or is invalid.
pub fn run(app: &AppContext, cmd: &ConfigCommand) -> Result<ExitCode> {
    let manifest = app.manifest()?;
    let renderer = app.renderer();
    match cmd {
        ConfigCommand::Validate => renderer.render_validated(&manifest, &app.manifest_path)?,
        ConfigCommand::Show => renderer.render_manifest(&manifest, &app.manifest_path)?,
    }
    Ok(ExitCode::SUCCESS)
}
