//! Shared test helpers: output constructors and manifest fixtures.

#![allow(dead_code)]

use std::path::Path;
use std::process::{ExitStatus, Output};

use stackctl_cli::domain::manifest::{Manifest, validate_manifest};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── `compose ps` fixtures ────────────────────────────────────────────────────

/// NDJSON `ps` output with every service running and healthy.
pub const PS_ALL_HEALTHY: &[u8] = br#"{"Service":"database","State":"running","Health":"healthy","Status":"Up 10 seconds (healthy)"}
{"Service":"cache","State":"running","Health":"healthy","Status":"Up 10 seconds (healthy)"}
{"Service":"server","State":"running","Health":"","Status":"Up 5 seconds"}
"#;

/// JSON-array `ps` output with the server still starting.
pub const PS_SERVER_STARTING: &[u8] = br#"[
  {"Service":"database","State":"running","Health":"healthy"},
  {"Service":"cache","State":"running","Health":"healthy"},
  {"Service":"server","State":"running","Health":"starting"}
]"#;

/// NDJSON `ps` output with the database container gone.
pub const PS_DATABASE_EXITED: &[u8] = br#"{"Service":"database","State":"exited","Health":"","Status":"Exited (1) 2 seconds ago"}
{"Service":"cache","State":"running","Health":"healthy"}
"#;

// ── Manifest fixtures ────────────────────────────────────────────────────────

pub const MANIFEST_YAML: &str = r#"
project: acme
output_dir: /srv/acme
secrets:
  provider: env
  bundles:
    - name: acme/app
  entries:
    - name: acme/db-password
      key: POSTGRES_PASSWORD
services:
  server:
    image: ghcr.io/acme/server:1.4.2
    ports: ["8080:8080"]
    healthcheck:
      test: ["CMD", "curl", "-fsS", "http://localhost:8080/health"]
  database:
    image: postgres:16
    user: acme
    name: acme
  cache:
    image: redis:7
env:
  APP_URL: https://acme.example.com
  API_TOKEN: "${secret:API_TOKEN}"
  LOG_LEVEL: info
health:
  attempts: 3
  interval_secs: 1
"#;

/// Parse and validate the standard test manifest.
pub fn manifest() -> Manifest {
    manifest_from(MANIFEST_YAML)
}

pub fn manifest_from(yaml: &str) -> Manifest {
    let manifest: Manifest = serde_yaml::from_str(yaml).expect("fixture manifest parses");
    validate_manifest(&manifest).expect("fixture manifest is valid");
    manifest
}

/// Same manifest, rendering into `dir`.
pub fn manifest_in(dir: &Path) -> Manifest {
    let mut m = manifest();
    m.output_dir = dir.to_path_buf();
    m
}
