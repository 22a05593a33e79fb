//! Output formatting module

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use std::path::Path;

use anyhow::Result;
use console::Term;
use owo_colors::OwoColorize as _;
pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::application::services::deploy::DeployOutcome;
use crate::application::services::render::RenderReport;
use crate::application::services::status::StackStatus;
use crate::domain::env::EnvMap;
use crate::domain::health::HealthReport;
use crate::domain::manifest::Manifest;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}

/// Dispatches command results to the renderer for the active output mode.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_version(version);
                Ok(())
            }
            Self::Json(r) => r.render_version(version),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_rendered(&self, report: &RenderReport) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_rendered(report);
                Ok(())
            }
            Self::Json(r) => r.render_rendered(report),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_deploy(&self, outcome: &DeployOutcome) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_deploy(outcome);
                Ok(())
            }
            Self::Json(r) => r.render_deploy(outcome),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_health(&self, report: &HealthReport) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_health(report);
                Ok(())
            }
            Self::Json(r) => r.render_health(report),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_status(&self, status: &StackStatus) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_status(status);
                Ok(())
            }
            Self::Json(r) => r.render_status(status),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_env(&self, env: &EnvMap, show_secrets: bool) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_env(env, show_secrets);
                Ok(())
            }
            Self::Json(r) => r.render_env(env, show_secrets),
        }
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_manifest(&self, manifest: &Manifest, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => r.render_manifest(manifest, path),
            Self::Json(r) => r.render_manifest(manifest),
        }
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_validated(&self, manifest: &Manifest, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_validated(manifest, path);
                Ok(())
            }
            Self::Json(r) => r.render_validated(manifest),
        }
    }

    /// Acknowledge an action that has no payload of its own. Human mode
    /// already reported it through the progress reporter.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_action(&self, action: &str, project: &str) -> Result<()> {
        match self {
            Self::Human(_) => Ok(()),
            Self::Json(r) => r.render_action(action, project),
        }
    }

    /// Report that the user declined a confirmation prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_cancelled(&self, action: &str, project: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_cancelled();
                Ok(())
            }
            Self::Json(r) => r.render_cancelled(action, project),
        }
    }
}
