//! Human-readable terminal renderer.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize as _;

use crate::application::services::deploy::DeployOutcome;
use crate::application::services::render::RenderReport;
use crate::application::services::status::StackStatus;
use crate::domain::deployment::DeploymentRecord;
use crate::domain::env::EnvMap;
use crate::domain::envfile::quote_value;
use crate::domain::health::{HealthReport, ServiceHealth};
use crate::domain::manifest::Manifest;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version. Printed even in quiet mode.
    pub fn render_version(&self, version: &str) {
        println!("stackctl {version}");
    }

    /// Render what `render` wrote.
    pub fn render_rendered(&self, report: &RenderReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.kv("Compose file:", &report.compose_path.display().to_string());
        self.ctx.kv("Env file:    ", &report.env_path.display().to_string());
        self.ctx.kv(
            "Variables:   ",
            &format!("{} ({} secret)", report.variables, report.secrets),
        );
        println!();
    }

    /// Render a finished deployment.
    pub fn render_deploy(&self, outcome: &DeployOutcome) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx
            .header(&format!("Deployed {}", outcome.record.project));
        self.render_services(&outcome.health);
        println!();
        self.ctx.kv(
            "Variables:",
            &format!("{} ({} secret)", outcome.render.variables, outcome.render.secrets),
        );
        self.ctx
            .kv("Compose:  ", &outcome.render.compose_path.display().to_string());
        println!();
    }

    /// Render the result of a health wait.
    pub fn render_health(&self, report: &HealthReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.render_services(report);
        println!();
    }

    /// Render a one-shot status snapshot.
    pub fn render_status(&self, status: &StackStatus) {
        println!();
        self.ctx.header(&format!("Project {}", status.project));
        for svc in &status.services {
            let line = format!(
                "{:<10} {:<10} {}",
                svc.service,
                svc.health.label(),
                svc.image.style(self.ctx.styles.dim)
            );
            self.print_health_line(&svc.health, &line);
        }
        println!();
        match &status.last_deploy {
            Some(record) => self.render_record(record),
            None => self.ctx.info("No deployment recorded. Run: stackctl deploy"),
        }
        println!();
    }

    fn render_record(&self, record: &DeploymentRecord) {
        self.ctx.kv(
            "Last deploy:",
            &record.deployed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        self.ctx.kv("Variables:  ", &record.variables.to_string());
        let short_sha = record.compose_sha256.get(..12).unwrap_or(&record.compose_sha256);
        self.ctx.kv("Compose:    ", &format!("sha256:{short_sha}"));
    }

    fn render_services(&self, report: &HealthReport) {
        for (role, health) in &report.services {
            let line = match health.reason() {
                Some(reason) => format!("{:<10} {} ({reason})", role.as_str(), health.label()),
                None => format!("{:<10} {}", role.as_str(), health.label()),
            };
            self.print_health_line(health, &line);
        }
    }

    fn print_health_line(&self, health: &ServiceHealth, line: &str) {
        match health {
            ServiceHealth::Ready => self.ctx.success(line),
            ServiceHealth::Pending(_) => self.ctx.info(line),
            ServiceHealth::Unhealthy(_) | ServiceHealth::Exited(_) => {
                println!("  {} {line}", "✗".style(self.ctx.styles.error));
            }
        }
    }

    pub fn render_cancelled(&self) {
        self.ctx.info("Cancelled.");
    }

    /// Print the environment in env-file syntax. This is the command's
    /// payload, so it is printed even in quiet mode.
    pub fn render_env(&self, env: &EnvMap, show_secrets: bool) {
        for (var, (key, value)) in env.iter().zip(env.shown(show_secrets)) {
            if var.secret && !show_secrets {
                println!("{key}={}", value.style(self.ctx.styles.secret));
            } else {
                println!("{key}={}", quote_value(value));
            }
        }
        if !self.ctx.quiet && !show_secrets && env.secret_count() > 0 {
            eprintln!(
                "{}",
                format!(
                    "# {} secret values hidden; pass --show-secrets to reveal",
                    env.secret_count()
                )
                .style(self.ctx.styles.dim)
            );
        }
    }

    /// Print the effective manifest back as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn render_manifest(&self, manifest: &Manifest, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(manifest).context("serializing manifest")?;
        if !self.ctx.quiet {
            println!("# {}", path.display());
        }
        print!("{yaml}");
        Ok(())
    }

    /// Render a successful `config validate`.
    pub fn render_validated(&self, manifest: &Manifest, path: &Path) {
        self.ctx.success(&format!(
            "{} is valid (project {}, {} catalog variables)",
            path.display(),
            manifest.project,
            manifest.env.len()
        ));
    }
}
