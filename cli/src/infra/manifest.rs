//! Manifest loading from a YAML file on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::error::ManifestError;
use crate::domain::manifest::{Manifest, validate_manifest};

/// Manifest file looked up in the working directory when no path is given.
pub const DEFAULT_MANIFEST: &str = "stackctl.yaml";

/// The manifest path to use: the explicit one, else `./stackctl.yaml`.
#[must_use]
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| PathBuf::from(DEFAULT_MANIFEST), Path::to_path_buf)
}

/// Read, parse and validate a manifest.
///
/// A relative `output_dir` is resolved against the manifest's own directory,
/// so the same manifest renders to the same place from any working dir.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, malformed, or fails
/// validation.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Err(ManifestError::NotFound(path.display().to_string()).into());
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let mut manifest: Manifest =
        serde_yaml::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    manifest.anchor_output_dir(path);
    validate_manifest(&manifest).with_context(|| format!("invalid manifest {}", path.display()))?;
    tracing::debug!(path = %path.display(), project = %manifest.project, "manifest loaded");
    Ok(manifest)
}
