//! Deployment record types and pure helpers.
//!
//! This module is free of I/O. Persistence lives in `crate::infra::state`.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::error::ManifestError;
use crate::domain::manifest::{Manifest, PROJECT_RE, ServiceRole};

/// Last successful deployment, persisted to `<output_dir>/.stackctl/state.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Compose project name.
    pub project: String,
    /// When `deploy` finished.
    pub deployed_at: DateTime<Utc>,
    /// Service name → image reference.
    pub images: BTreeMap<String, String>,
    /// Number of variables written to the env file.
    pub variables: usize,
    /// SHA-256 of the rendered compose file.
    pub compose_sha256: String,
}

impl DeploymentRecord {
    /// Build a record for a deployment finishing at `now`.
    #[must_use]
    pub fn new(
        manifest: &Manifest,
        variables: usize,
        compose_sha256: String,
        now: DateTime<Utc>,
    ) -> Self {
        let images = ServiceRole::ALL
            .into_iter()
            .map(|role| (role.as_str().to_string(), manifest.image(role).to_string()))
            .collect();
        Self {
            project: manifest.project.clone(),
            deployed_at: now,
            images,
            variables,
            compose_sha256,
        }
    }
}

/// Reject records whose project name could not have come from a valid manifest.
///
/// # Errors
///
/// Returns an error if the project name is malformed.
pub fn validate_record(record: &DeploymentRecord) -> Result<()> {
    if !PROJECT_RE.is_match(&record.project) {
        return Err(ManifestError::ValidationFailed(format!(
            "state file project '{}' is not a valid project name",
            record.project
        ))
        .into());
    }
    Ok(())
}

/// Lowercase hex encoding.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX[(b >> 4) as usize]));
        out.push(char::from(HEX[(b & 0xf) as usize]));
    }
    out
}

/// SHA-256 hex digest of `data`.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    hex_encode(&Sha256::digest(data))
}
