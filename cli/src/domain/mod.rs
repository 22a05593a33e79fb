//! Domain layer: pure deployment logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::env`.
//! All functions are synchronous and take data in, returning data out.

pub mod compose;
pub mod deployment;
pub mod env;
pub mod envfile;
pub mod error;
pub mod health;
pub mod manifest;

pub use deployment::DeploymentRecord;
pub use env::{EnvMap, EnvVar};
pub use error::{DeployError, EnvError, ManifestError, SecretError};
pub use health::{HealthReport, ServiceHealth};
pub use manifest::{Manifest, ServiceRole, validate_manifest};
