//! Application service: full deployment use-case.
//!
//! secrets → environment → render → pull (concurrent) → up → wait healthy →
//! record. The first hard error stops the run; nothing is rolled back.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::application::ports::{
    ArtifactWriter, CommandRunner, DeploymentStore, ProgressReporter, SecretStore,
};
use crate::application::services::health::{WaitOptions, wait_healthy};
use crate::application::services::render::{RenderReport, prepare_environment, render_artifacts};
use crate::application::services::{compose, images};
use crate::domain::deployment::DeploymentRecord;
use crate::domain::health::HealthReport;
use crate::domain::manifest::Manifest;

/// Infrastructure a deployment runs against.
pub struct DeployPorts<'a, C, S, W, D> {
    pub runner: &'a C,
    pub secrets: &'a S,
    pub writer: &'a W,
    pub state: &'a D,
}

/// Per-run knobs.
pub struct DeployOptions<'a, R, H> {
    pub reporter: &'a R,
    /// Host environment lookup for `${env:..}` references.
    pub host_env: &'a H,
    pub wait: WaitOptions,
    /// Assume images are already present locally.
    pub skip_pull: bool,
}

/// Outcome of a successful deployment.
#[derive(Debug)]
pub struct DeployOutcome {
    pub render: RenderReport,
    pub health: HealthReport,
    pub record: DeploymentRecord,
}

/// Run the whole deployment.
///
/// # Errors
///
/// Returns the first error from any step.
pub async fn deploy<C, S, W, D, R, H>(
    manifest: &Manifest,
    ports: DeployPorts<'_, C, S, W, D>,
    opts: DeployOptions<'_, R, H>,
) -> Result<DeployOutcome>
where
    C: CommandRunner,
    S: SecretStore,
    W: ArtifactWriter,
    D: DeploymentStore,
    R: ProgressReporter,
    H: Fn(&str) -> Option<String>,
{
    let DeployPorts {
        runner,
        secrets,
        writer,
        state,
    } = ports;
    let DeployOptions {
        reporter,
        host_env,
        wait,
        skip_pull,
    } = opts;

    tracing::info!(project = %manifest.project, "deploy started");

    let env = prepare_environment(manifest, secrets, reporter, host_env).await?;
    let render = render_artifacts(manifest, &env, writer, reporter)?;

    if skip_pull {
        reporter.warn("skipping image pull");
    } else {
        images::pull_images(runner, manifest, reporter).await?;
    }

    compose::up(runner, manifest, reporter).await?;
    let health = wait_healthy(runner, manifest, wait, reporter).await?;

    let record = DeploymentRecord::new(
        manifest,
        render.variables,
        render.compose_sha256.clone(),
        Utc::now(),
    );
    state
        .save_async(&record)
        .await
        .context("recording deployment")?;

    tracing::info!(project = %manifest.project, "deploy finished");
    Ok(DeployOutcome {
        render,
        health,
        record,
    })
}
