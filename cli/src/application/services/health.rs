//! Readiness waiting after `compose up`.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::application::services::compose::ps;
use crate::domain::error::DeployError;
use crate::domain::health::HealthReport;
use crate::domain::manifest::{HealthConfig, Manifest};

/// Polling schedule for [`wait_healthy`].
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub attempts: u32,
    pub interval: Duration,
}

impl From<&HealthConfig> for WaitOptions {
    fn from(config: &HealthConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            interval: Duration::from_secs(config.interval_secs),
        }
    }
}

/// Poll `compose ps` until every service is ready.
///
/// A container that has stopped fails immediately. A failing `ps` call is
/// treated like a not-yet-ready stack and retried; if it never succeeds, its
/// last error is returned under the timeout.
///
/// # Errors
///
/// - [`DeployError::Unhealthy`] if a container exits, or still reports an
///   unhealthy healthcheck when attempts run out.
/// - [`DeployError::HealthTimeout`] if services are still starting when
///   attempts run out.
pub async fn wait_healthy(
    runner: &impl CommandRunner,
    manifest: &Manifest,
    opts: WaitOptions,
    reporter: &impl ProgressReporter,
) -> Result<HealthReport> {
    reporter.step("waiting for services to become healthy...");
    let mut last: Option<HealthReport> = None;
    let mut last_error: Option<anyhow::Error> = None;

    for attempt in 1..=opts.attempts {
        match ps(runner, manifest).await {
            Ok(rows) => {
                let report = HealthReport::from_containers(&rows);
                if report.all_ready() {
                    reporter.success("all services healthy");
                    return Ok(report);
                }
                if let Some((service, reason)) = report.first_exited() {
                    return Err(DeployError::Unhealthy {
                        service: service.to_string(),
                        reason: reason.to_string(),
                    }
                    .into());
                }
                tracing::debug!(attempt, pending = %report.pending_names(), "services not ready");
                last = Some(report);
            }
            Err(e) => {
                tracing::debug!(attempt, error = %format!("{e:#}"), "compose ps failed");
                last_error = Some(e);
            }
        }

        if attempt < opts.attempts {
            tokio::time::sleep(opts.interval).await;
        }
    }

    let Some(report) = last else {
        let timeout = DeployError::HealthTimeout {
            attempts: opts.attempts,
            pending: "database, cache, server".to_string(),
        };
        return Err(match last_error {
            Some(cause) => cause.context(timeout),
            None => timeout.into(),
        });
    };
    if let Some((service, reason)) = report.first_unhealthy() {
        return Err(DeployError::Unhealthy {
            service: service.to_string(),
            reason: reason.to_string(),
        }
        .into());
    }
    Err(DeployError::HealthTimeout {
        attempts: opts.attempts,
        pending: report.pending_names(),
    }
    .into())
}
