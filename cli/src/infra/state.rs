//! Infrastructure implementation of the `DeploymentStore` port.
//!
//! `StateManager` provides async load/save using `tokio::task::spawn_blocking`
//! with atomic write (temp file + rename) to prevent state corruption.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::DeploymentStore;
use crate::domain::deployment::{DeploymentRecord, validate_record};
use crate::infra::fs::write_via_temp;

/// Deployment record manager for one output directory.
pub struct StateManager {
    path: PathBuf,
}

impl StateManager {
    /// Create a state manager for an explicit state file path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_sync(&self) -> Result<Option<DeploymentRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading state file {}", self.path.display()))?;
        let record: DeploymentRecord = serde_json::from_str(&content)
            .with_context(|| format!("parsing state file {}", self.path.display()))?;
        validate_record(&record)?;
        Ok(Some(record))
    }

    fn save_sync(&self, record: &DeploymentRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(record).context("serializing state")?;

        let temp_path = self.path.with_extension("json.tmp");
        write_via_temp(&self.path, &temp_path, &content, true)
            .with_context(|| format!("saving state file {}", self.path.display()))
    }
}

impl DeploymentStore for StateManager {
    async fn load_async(&self) -> Result<Option<DeploymentRecord>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || StateManager::with_path(path).load_sync())
            .await
            .context("state load task panicked")?
    }

    async fn save_async(&self, record: &DeploymentRecord) -> Result<()> {
        let path = self.path.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || StateManager::with_path(path).save_sync(&record))
            .await
            .context("state save task panicked")?
    }
}
