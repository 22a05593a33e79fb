//! Command implementations

pub mod config;
pub mod deploy;
pub mod down;
pub mod env;
pub mod health;
pub mod pull;
pub mod render;
pub mod status;
pub mod up;
pub mod version;

use anyhow::Result;

use crate::domain::manifest::Manifest;

/// Host environment lookup for `${env:KEY}` references.
pub(crate) fn host_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Fail early when a command needs the compose file but `render` has not
/// produced one yet.
pub(crate) fn require_rendered(manifest: &Manifest) -> Result<()> {
    let path = manifest.compose_path();
    if !path.exists() {
        anyhow::bail!(
            "No compose file at {}. Run: stackctl render",
            path.display()
        );
    }
    Ok(())
}
