//! Port test doubles shared by the service tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use stackctl_cli::application::ports::{
    ArtifactWriter, CommandRunner, DeploymentStore, ProgressReporter, SecretStore,
};
use stackctl_cli::domain::DeploymentRecord;

use crate::helpers::{err_output, ok_output};

// ── CommandRunner ────────────────────────────────────────────────────────────

/// Records every command and answers like a container engine would.
///
/// `pull` succeeds unless the image contains `fail_pull`; `ps` replays the
/// queued outputs (the last one repeats); everything else succeeds.
pub struct EngineRecorder {
    calls: Mutex<Vec<String>>,
    fail_pull: Option<&'static str>,
    ps_replies: Mutex<VecDeque<Output>>,
}

impl EngineRecorder {
    pub fn new(ps_replies: Vec<Output>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_pull: None,
            ps_replies: Mutex::new(ps_replies.into()),
        }
    }

    pub fn failing_pull(mut self, image_fragment: &'static str) -> Self {
        self.fail_pull = Some(image_fragment);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    /// Commands whose argument list contains `needle`.
    pub fn calls_with(&self, needle: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(' ').any(|arg| arg == needle))
            .collect()
    }

    fn next_ps(&self) -> Output {
        let mut replies = self.ps_replies.lock().expect("lock");
        if replies.len() > 1 {
            replies.pop_front().expect("non-empty")
        } else {
            replies.front().cloned().unwrap_or_else(|| ok_output(b""))
        }
    }
}

impl CommandRunner for EngineRecorder {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, Duration::from_secs(60))
            .await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<Output> {
        self.calls
            .lock()
            .expect("lock")
            .push(format!("{program} {}", args.join(" ")));

        if args.first() == Some(&"pull") {
            let image = args.get(1).copied().unwrap_or_default();
            return Ok(match self.fail_pull {
                Some(fragment) if image.contains(fragment) => {
                    err_output(1, b"Error response from daemon: manifest unknown")
                }
                _ => ok_output(b""),
            });
        }
        if args.contains(&"ps") {
            return Ok(self.next_ps());
        }
        Ok(ok_output(b""))
    }
}

// ── SecretStore ──────────────────────────────────────────────────────────────

/// In-memory secret store that remembers fetch order.
pub struct MemorySecretStore {
    values: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl MemorySecretStore {
    pub fn new(values: &[(&str, &str)]) -> Self {
        Self {
            values: values
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Secrets matching the standard test manifest.
    pub fn standard() -> Self {
        Self::new(&[
            (
                "acme/app",
                r#"{"API_TOKEN":"tok-123","SMTP_PORT":587,"FEATURE_X":true}"#,
            ),
            ("acme/db-password", "p@ss word"),
        ])
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("lock").clone()
    }
}

impl SecretStore for MemorySecretStore {
    async fn fetch(&self, name: &str) -> Result<String> {
        self.fetched.lock().expect("lock").push(name.to_string());
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("secret '{name}' not found"))
    }
}

// ── ArtifactWriter ───────────────────────────────────────────────────────────

/// Keeps written files in memory: path → (content, private).
#[derive(Default)]
pub struct MemoryWriter {
    files: Mutex<BTreeMap<PathBuf, (String, bool)>>,
}

impl MemoryWriter {
    pub fn file(&self, path: &Path) -> Option<(String, bool)> {
        self.files.lock().expect("lock").get(path).cloned()
    }

    pub fn count(&self) -> usize {
        self.files.lock().expect("lock").len()
    }
}

impl ArtifactWriter for MemoryWriter {
    fn write_atomic(&self, path: &Path, content: &str, private: bool) -> Result<()> {
        self.files
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), (content.to_string(), private));
        Ok(())
    }
}

// ── DeploymentStore ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryDeploymentStore {
    record: Mutex<Option<DeploymentRecord>>,
}

impl MemoryDeploymentStore {
    pub fn with(record: DeploymentRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }

    pub fn saved(&self) -> Option<DeploymentRecord> {
        self.record.lock().expect("lock").clone()
    }
}

impl DeploymentStore for MemoryDeploymentStore {
    async fn load_async(&self) -> Result<Option<DeploymentRecord>> {
        Ok(self.saved())
    }

    async fn save_async(&self, record: &DeploymentRecord) -> Result<()> {
        *self.record.lock().expect("lock") = Some(record.clone());
        Ok(())
    }
}

// ── ProgressReporter ─────────────────────────────────────────────────────────

/// Collects progress events so tests can assert on them.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("warn: {message}"));
    }
}

/// Host environment with nothing set.
pub fn no_host_env(_: &str) -> Option<String> {
    None
}
