//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::DeploymentRecord;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Secret Store Port ─────────────────────────────────────────────────────────

/// Read-only access to a secret store.
#[allow(async_fn_in_trait)]
pub trait SecretStore {
    /// Fetch the current value of the secret called `name`.
    async fn fetch(&self, name: &str) -> Result<String>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Filesystem and State Ports ────────────────────────────────────────────────

/// Writes rendered artifacts to disk.
pub trait ArtifactWriter {
    /// Atomically replace `path` with `content`, creating parent directories.
    /// When `private` is set the file is readable by the owner only.
    fn write_atomic(&self, path: &Path, content: &str, private: bool) -> Result<()>;
}

/// Persists the last deployment record.
#[allow(async_fn_in_trait)]
pub trait DeploymentStore {
    /// Load the record, returning `None` if no deployment has been recorded.
    async fn load_async(&self) -> Result<Option<DeploymentRecord>>;
    /// Persist the given record.
    async fn save_async(&self, record: &DeploymentRecord) -> Result<()>;
}
