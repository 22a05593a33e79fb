//! Application service: environment preparation and artifact rendering.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{ArtifactWriter, ProgressReporter, SecretStore};
use crate::application::services::secrets::collect_secrets;
use crate::domain::compose::{build_compose, render_compose_yaml};
use crate::domain::deployment::sha256_hex;
use crate::domain::env::{EnvMap, assemble};
use crate::domain::envfile::render_env_file;
use crate::domain::manifest::Manifest;

/// What `render_artifacts` wrote.
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub compose_path: PathBuf,
    pub env_path: PathBuf,
    pub variables: usize,
    pub secrets: usize,
    pub compose_sha256: String,
}

/// Fetch secrets and assemble the full environment.
///
/// # Errors
///
/// Returns an error if a secret cannot be fetched or the catalog cannot be
/// interpolated.
pub async fn prepare_environment(
    manifest: &Manifest,
    store: &impl SecretStore,
    reporter: &impl ProgressReporter,
    host_env: &impl Fn(&str) -> Option<String>,
) -> Result<EnvMap> {
    let secrets = collect_secrets(store, &manifest.secrets, reporter).await?;
    let env = assemble(manifest, &secrets, host_env).context("assembling environment")?;
    tracing::info!(
        variables = env.len(),
        secrets = env.secret_count(),
        "environment assembled"
    );
    Ok(env)
}

/// Write the compose file and the env file into the manifest's output dir.
///
/// The env file is written owner-only since it carries secret values.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn render_artifacts(
    manifest: &Manifest,
    env: &EnvMap,
    writer: &impl ArtifactWriter,
    reporter: &impl ProgressReporter,
) -> Result<RenderReport> {
    let compose_yaml = render_compose_yaml(&build_compose(manifest))?;
    let env_body = render_env_file(&manifest.project, env);

    let compose_path = manifest.compose_path();
    let env_path = manifest.env_path();

    writer
        .write_atomic(&env_path, &env_body, true)
        .with_context(|| format!("writing {}", env_path.display()))?;
    writer
        .write_atomic(&compose_path, &compose_yaml, false)
        .with_context(|| format!("writing {}", compose_path.display()))?;

    reporter.success(&format!(
        "rendered {} ({} variables)",
        compose_path.display(),
        env.len()
    ));

    Ok(RenderReport {
        compose_path,
        env_path,
        variables: env.len(),
        secrets: env.secret_count(),
        compose_sha256: sha256_hex(compose_yaml.as_bytes()),
    })
}
