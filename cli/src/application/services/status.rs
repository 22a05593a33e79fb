//! Application service: one-shot stack status.

use anyhow::Result;
use serde::Serialize;

use crate::application::ports::{CommandRunner, DeploymentStore};
use crate::application::services::compose::ps;
use crate::domain::deployment::DeploymentRecord;
use crate::domain::health::{HealthReport, ServiceHealth};
use crate::domain::manifest::{Manifest, ServiceRole};

/// Status of one service, as reported to the user.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub service: &'static str,
    pub image: String,
    pub health: ServiceHealth,
}

/// Snapshot returned by [`stack_status`].
#[derive(Debug, Clone, Serialize)]
pub struct StackStatus {
    pub project: String,
    pub services: Vec<ServiceStatus>,
    pub last_deploy: Option<DeploymentRecord>,
}

impl StackStatus {
    #[must_use]
    pub fn all_ready(&self) -> bool {
        self.services.iter().all(|s| s.health == ServiceHealth::Ready)
    }
}

/// Query container state and the last deployment record.
///
/// # Errors
///
/// Returns an error if `compose ps` fails or the state file is unreadable.
pub async fn stack_status(
    runner: &impl CommandRunner,
    manifest: &Manifest,
    state: &impl DeploymentStore,
) -> Result<StackStatus> {
    let rows = ps(runner, manifest).await?;
    let report = HealthReport::from_containers(&rows);
    let services = report
        .services
        .into_iter()
        .map(|(role, health): (ServiceRole, ServiceHealth)| ServiceStatus {
            service: role.as_str(),
            image: manifest.image(role).to_string(),
            health,
        })
        .collect();

    Ok(StackStatus {
        project: manifest.project.clone(),
        services,
        last_deploy: state.load_async().await?,
    })
}
