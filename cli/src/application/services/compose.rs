//! Compose lifecycle commands: up, down, ps.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::application::services::output_detail;
use crate::domain::error::DeployError;
use crate::domain::health::{ContainerStatus, parse_ps_output};
use crate::domain::manifest::Manifest;

/// Limit for `compose up` (creates networks, volumes, containers).
pub const UP_TIMEOUT: Duration = Duration::from_secs(300);

/// Limit for `compose down`.
pub const DOWN_TIMEOUT: Duration = Duration::from_secs(120);

/// Build `compose -f <file> -p <project> <extra...>` arguments.
#[must_use]
pub fn compose_args(manifest: &Manifest, extra: &[&str]) -> Vec<String> {
    let mut args = vec![
        "compose".to_string(),
        "-f".to_string(),
        manifest.compose_path().display().to_string(),
        "-p".to_string(),
        manifest.project.clone(),
    ];
    args.extend(extra.iter().map(|a| (*a).to_string()));
    args
}

async fn run_compose(
    runner: &impl CommandRunner,
    manifest: &Manifest,
    action: &'static str,
    extra: &[&str],
    timeout: Duration,
) -> Result<String> {
    let args = compose_args(manifest, extra);
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();
    let program = manifest.engine.program();
    tracing::debug!(%program, args = ?argv, "running compose {action}");

    let output = runner
        .run_with_timeout(program, &argv, timeout)
        .await
        .with_context(|| format!("running {program} compose {action}"))?;

    if !output.status.success() {
        return Err(DeployError::Compose {
            action,
            detail: output_detail(&output),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Start the stack detached.
///
/// # Errors
///
/// Returns [`DeployError::Compose`] if `compose up` exits non-zero.
pub async fn up(
    runner: &impl CommandRunner,
    manifest: &Manifest,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step(&format!("starting project {}...", manifest.project));
    run_compose(runner, manifest, "up", &["up", "-d", "--remove-orphans"], UP_TIMEOUT).await?;
    reporter.success("containers started");
    Ok(())
}

/// Stop and remove the stack's containers, and optionally its volumes.
///
/// # Errors
///
/// Returns [`DeployError::Compose`] if `compose down` exits non-zero.
pub async fn down(
    runner: &impl CommandRunner,
    manifest: &Manifest,
    remove_volumes: bool,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step(&format!("stopping project {}...", manifest.project));
    let extra: &[&str] = if remove_volumes {
        &["down", "--volumes"]
    } else {
        &["down"]
    };
    run_compose(runner, manifest, "down", extra, DOWN_TIMEOUT).await?;
    if remove_volumes {
        reporter.warn("volumes removed: database and cache data are gone");
    }
    reporter.success("containers removed");
    Ok(())
}

/// List the stack's containers.
///
/// # Errors
///
/// Returns an error if `compose ps` fails or its output cannot be parsed.
pub async fn ps(runner: &impl CommandRunner, manifest: &Manifest) -> Result<Vec<ContainerStatus>> {
    let stdout = ps_stdout(runner, manifest).await?;
    parse_ps_output(&stdout)
}

async fn ps_stdout(runner: &impl CommandRunner, manifest: &Manifest) -> Result<String> {
    let args = compose_args(manifest, &["ps", "--all", "--format", "json"]);
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = runner
        .run(manifest.engine.program(), &argv)
        .await
        .context("running compose ps")?;
    if !output.status.success() {
        return Err(DeployError::Compose {
            action: "ps",
            detail: output_detail(&output),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
