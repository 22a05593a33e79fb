//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and `JsonRenderer` for successful results. Everything is
//! written to stdout pretty-printed.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use crate::application::services::deploy::DeployOutcome;
use crate::application::services::render::RenderReport;
use crate::application::services::status::StackStatus;
use crate::domain::env::EnvMap;
use crate::domain::health::{HealthReport, ServiceHealth};
use crate::domain::manifest::Manifest;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Acknowledgement for an action without a payload of its own.
#[must_use]
pub fn action_object(action: &str, project: &str) -> serde_json::Value {
    json!({ "action": action, "project": project, "ok": true })
}

/// Acknowledgement for an action the user declined at the prompt.
#[must_use]
pub fn cancelled_object(action: &str, project: &str) -> serde_json::Value {
    json!({ "action": action, "project": project, "ok": false, "cancelled": true })
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{out}");
    Ok(())
}

#[derive(Serialize)]
struct ServiceHealthJson<'a> {
    service: &'static str,
    health: &'a ServiceHealth,
}

fn health_json(report: &HealthReport) -> Vec<ServiceHealthJson<'_>> {
    report
        .services
        .iter()
        .map(|(role, health)| ServiceHealthJson {
            service: role.as_str(),
            health,
        })
        .collect()
}

/// Renders command results as machine-readable JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        print_json(&json!({ "version": version }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_rendered(&self, report: &RenderReport) -> Result<()> {
        print_json(report)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_deploy(&self, outcome: &DeployOutcome) -> Result<()> {
        print_json(&json!({
            "rendered": outcome.render,
            "services": health_json(&outcome.health),
            "record": outcome.record,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_health(&self, report: &HealthReport) -> Result<()> {
        print_json(&json!({
            "healthy": report.all_ready(),
            "services": health_json(report),
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_status(&self, status: &StackStatus) -> Result<()> {
        print_json(status)
    }

    /// Variables as an ordered array; secret values are replaced unless
    /// `show_secrets` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_env(&self, env: &EnvMap, show_secrets: bool) -> Result<()> {
        let variables: Vec<_> = env
            .iter()
            .zip(env.shown(show_secrets))
            .map(|(var, (key, value))| json!({ "key": key, "value": value, "secret": var.secret }))
            .collect();
        print_json(&json!({ "variables": variables }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_manifest(&self, manifest: &Manifest) -> Result<()> {
        print_json(manifest)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_validated(&self, manifest: &Manifest) -> Result<()> {
        print_json(&json!({
            "valid": true,
            "project": manifest.project,
            "variables": manifest.env.len(),
        }))
    }

    /// Generic acknowledgement for actions with no payload (`pull`, `up`, `down`).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_action(&self, action: &str, project: &str) -> Result<()> {
        print_json(&action_object(action, project))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_cancelled(&self, action: &str, project: &str) -> Result<()> {
        print_json(&cancelled_object(action, project))
    }
}
