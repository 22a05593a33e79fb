//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Manifest errors ───────────────────────────────────────────────────────────

/// Errors raised while loading or validating the deployment manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest not found at {0}. Pass --file or set STACKCTL_MANIFEST.")]
    NotFound(String),

    #[error("cannot parse manifest {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Manifest validation failed:\n{0}")]
    ValidationFailed(String),
}

// ── Secret errors ─────────────────────────────────────────────────────────────

/// Errors raised while fetching or decoding secrets.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to fetch secret '{name}': {detail}")]
    Fetch { name: String, detail: String },

    #[error("secret '{name}' is not set (expected environment variable {var})")]
    MissingEnv { name: String, var: String },

    #[error("secret bundle '{0}' is not a JSON object")]
    NotObject(String),

    #[error("secret bundle '{name}' has a nested value under '{key}'; only flat objects are supported")]
    NotFlat { name: String, key: String },

    #[error("secret bundle '{name}' produced invalid variable name '{key}'")]
    InvalidKey { name: String, key: String },
}

// ── Environment errors ────────────────────────────────────────────────────────

/// Errors raised while interpolating the environment catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("{var}: secret '{key}' is not defined by any bundle or entry")]
    UnresolvedSecret { var: String, key: String },

    #[error("{var}: host environment variable '{key}' is not set")]
    UnresolvedHostVar { var: String, key: String },

    #[error("{var}: variable '{key}' is not defined before this point")]
    UnresolvedVar { var: String, key: String },

    #[error("database password variable '{key}' is not set by any secret or catalog entry")]
    MissingPassword { key: String },

    #[error("{var}: unsupported reference '{reference}' (use ${{secret:..}}, ${{env:..}}, ${{var:..}} or $$)")]
    BadReference { var: String, reference: String },
}

// ── Deployment errors ─────────────────────────────────────────────────────────

/// Errors raised while driving the container engine.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("failed to pull {image}:\n{detail}\nCheck registry access and retry with: stackctl pull")]
    Pull { image: String, detail: String },

    #[error("compose {action} failed:\n{detail}")]
    Compose { action: &'static str, detail: String },

    #[error("Service '{service}' is not healthy ({reason}).\nInspect with: stackctl status")]
    Unhealthy { service: String, reason: String },

    #[error("Services did not become healthy after {attempts} checks. Still waiting on: {pending}")]
    HealthTimeout { attempts: u32, pending: String },
}
