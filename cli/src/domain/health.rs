//! Service health derived from `compose ps --format json`.
//!
//! Depending on the compose version the output is either a single JSON array
//! or one JSON object per line; both are accepted.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::manifest::ServiceRole;

/// One row of `compose ps` output. Only the fields we read are modelled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerStatus {
    #[serde(rename = "Service")]
    pub service: String,
    #[serde(rename = "State", default)]
    pub state: String,
    #[serde(rename = "Health", default)]
    pub health: String,
    #[serde(rename = "Status", default)]
    pub status: String,
}

/// Parse `compose ps --format json` stdout.
///
/// # Errors
///
/// Returns an error if any non-blank line is not valid JSON of the expected
/// shape.
pub fn parse_ps_output(stdout: &str) -> Result<Vec<ContainerStatus>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("parsing compose ps JSON array");
    }
    trimmed
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).context("parsing compose ps JSON line"))
        .collect()
}

/// Readiness of a single service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ServiceHealth {
    /// Running and healthy, or running without a healthcheck.
    Ready,
    /// Still coming up.
    Pending(String),
    /// Running, but its healthcheck reports unhealthy.
    Unhealthy(String),
    /// Container stopped; it will not become ready on its own.
    Exited(String),
}

impl ServiceHealth {
    /// Short label for human output.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Ready => "healthy",
            Self::Pending(_) => "starting",
            Self::Unhealthy(_) => "unhealthy",
            Self::Exited(_) => "exited",
        }
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ready => None,
            Self::Pending(r) | Self::Unhealthy(r) | Self::Exited(r) => Some(r),
        }
    }
}

/// Classify one service from its `ps` row, if any.
#[must_use]
pub fn classify(container: Option<&ContainerStatus>) -> ServiceHealth {
    let Some(c) = container else {
        return ServiceHealth::Pending("not created".to_string());
    };
    match c.state.as_str() {
        "running" => match c.health.as_str() {
            "" | "healthy" => ServiceHealth::Ready,
            "unhealthy" => ServiceHealth::Unhealthy(describe(c)),
            other => ServiceHealth::Pending(format!("health: {other}")),
        },
        "exited" | "dead" => ServiceHealth::Exited(describe(c)),
        other => ServiceHealth::Pending(format!("state: {other}")),
    }
}

fn describe(c: &ContainerStatus) -> String {
    if c.status.is_empty() {
        format!("state: {}", c.state)
    } else {
        c.status.clone()
    }
}

/// Health of all three stack services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub services: Vec<(ServiceRole, ServiceHealth)>,
}

impl HealthReport {
    /// Build a report from parsed `ps` rows. Rows for unknown services are
    /// ignored.
    #[must_use]
    pub fn from_containers(containers: &[ContainerStatus]) -> Self {
        let services = ServiceRole::ALL
            .into_iter()
            .map(|role| {
                let row = containers.iter().find(|c| c.service == role.as_str());
                (role, classify(row))
            })
            .collect();
        Self { services }
    }

    #[must_use]
    pub fn all_ready(&self) -> bool {
        self.services.iter().all(|(_, h)| *h == ServiceHealth::Ready)
    }

    /// First service whose container has stopped.
    #[must_use]
    pub fn first_exited(&self) -> Option<(ServiceRole, &str)> {
        self.services.iter().find_map(|(role, h)| match h {
            ServiceHealth::Exited(reason) => Some((*role, reason.as_str())),
            _ => None,
        })
    }

    /// First service reporting an unhealthy healthcheck.
    #[must_use]
    pub fn first_unhealthy(&self) -> Option<(ServiceRole, &str)> {
        self.services.iter().find_map(|(role, h)| match h {
            ServiceHealth::Unhealthy(reason) => Some((*role, reason.as_str())),
            _ => None,
        })
    }

    /// Comma-separated names of services that are not ready.
    #[must_use]
    pub fn pending_names(&self) -> String {
        self.services
            .iter()
            .filter(|(_, h)| *h != ServiceHealth::Ready)
            .map(|(role, _)| role.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
