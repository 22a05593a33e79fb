//! Image pulling for the three stack services.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::application::services::output_detail;
use crate::domain::error::DeployError;
use crate::domain::manifest::{Engine, Manifest, ServiceRole};

/// Per-image pull limit.
pub const PULL_TIMEOUT: Duration = Duration::from_secs(600);

/// Pull a single image with `<engine> pull <image>`.
///
/// # Errors
///
/// Returns [`DeployError::Pull`] with the captured stderr when the engine
/// exits non-zero, or a contextual error if it cannot be run or times out.
pub async fn pull_image(runner: &impl CommandRunner, engine: Engine, image: &str) -> Result<()> {
    tracing::info!(%image, "pulling image");
    let output = runner
        .run_with_timeout(engine.program(), &["pull", image], PULL_TIMEOUT)
        .await
        .with_context(|| format!("pulling {image}"))?;

    if output.status.success() {
        tracing::debug!(%image, "pull complete");
        return Ok(());
    }
    Err(DeployError::Pull {
        image: image.to_string(),
        detail: output_detail(&output),
    }
    .into())
}

/// Pull the database, cache and server images concurrently.
///
/// The three pulls are independent; the first failure aborts the join and
/// is returned.
///
/// # Errors
///
/// Returns the first pull error encountered.
pub async fn pull_images(
    runner: &impl CommandRunner,
    manifest: &Manifest,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let [database, cache, server] = ServiceRole::ALL.map(|role| manifest.image(role));
    reporter.step(&format!("pulling {database}, {cache}, {server}..."));

    tokio::try_join!(
        pull_image(runner, manifest.engine, database),
        pull_image(runner, manifest.engine, cache),
        pull_image(runner, manifest.engine, server),
    )?;

    reporter.success("images pulled");
    Ok(())
}
