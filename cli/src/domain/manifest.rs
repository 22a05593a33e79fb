//! Deployment manifest schema and validation.
//!
//! Pure types and functions only: no I/O, no async, no filesystem access.
//! Loading from disk lives in `crate::infra::manifest`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::error::ManifestError;

// ── Constants ────────────────────────────────────────────────────────────────

/// File name of the rendered compose file inside `output_dir`.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// File name of the rendered environment file inside `output_dir`.
pub const ENV_FILE: &str = ".env";

/// Directory (inside `output_dir`) holding the last deployment record.
pub const STATE_DIR: &str = ".stackctl";

pub static PROJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("valid regex")
});

/// Portable environment variable name.
pub static ENV_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex")
});

/// Compose short port syntax: `[ip:]host:container[/proto]` or a bare port.
static PORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(\d{1,3}(\.\d{1,3}){3}:)?\d{1,5}(:\d{1,5})?(/(tcp|udp))?$").expect("valid regex")
});

// ── Schema ───────────────────────────────────────────────────────────────────

/// Top-level manifest, stored in `stackctl.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Compose project name.
    pub project: String,
    /// Container engine used for pull and compose.
    #[serde(default)]
    pub engine: Engine,
    /// Directory receiving the rendered artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    pub secrets: SecretsConfig,
    pub services: Services,
    /// Static variable catalog, in declaration order.
    #[serde(default)]
    pub env: EnvCatalog,
    #[serde(default)]
    pub health: HealthConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./deploy")
}

/// Container engine binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Docker,
    Podman,
}

impl Engine {
    /// Program name to invoke.
    #[must_use]
    pub fn program(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }
}

/// Where secrets come from and which ones to read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretsConfig {
    pub provider: SecretProvider,
    /// AWS region override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Google Cloud project override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Secrets holding a flat JSON object of variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bundles: Vec<SecretBundle>,
    /// Secrets holding one plain value each.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<SecretEntry>,
}

/// Secret store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretProvider {
    /// AWS Secrets Manager through the `aws` CLI.
    Aws,
    /// Google Secret Manager through the `gcloud` CLI.
    Gcloud,
    /// `STACKCTL_SECRET_*` variables in the process environment.
    Env,
}

impl fmt::Display for SecretProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Aws => "aws",
            Self::Gcloud => "gcloud",
            Self::Env => "env",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretBundle {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretEntry {
    pub name: String,
    /// Variable receiving the secret value.
    pub key: String,
}

/// The three containers of the stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Services {
    pub server: ServerService,
    pub database: DatabaseService,
    pub cache: CacheService,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerService {
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<HealthcheckSpec>,
}

/// Container-level healthcheck, rendered verbatim into the compose file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthcheckSpec {
    pub test: Vec<String>,
    #[serde(default = "default_check_interval")]
    pub interval: String,
    #[serde(default = "default_check_timeout")]
    pub timeout: String,
    #[serde(default = "default_check_retries")]
    pub retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_period: Option<String>,
}

fn default_check_interval() -> String {
    "10s".to_string()
}

fn default_check_timeout() -> String {
    "5s".to_string()
}

fn default_check_retries() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseService {
    pub image: String,
    #[serde(default = "default_db_identity")]
    pub user: String,
    #[serde(default = "default_db_identity")]
    pub name: String,
    /// Variable that carries the database password.
    #[serde(default = "default_password_key")]
    pub password_key: String,
}

fn default_db_identity() -> String {
    "postgres".to_string()
}

fn default_password_key() -> String {
    "POSTGRES_PASSWORD".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheService {
    pub image: String,
}

/// Readiness polling after `up`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_attempts() -> u32 {
    60
}

fn default_interval_secs() -> u64 {
    5
}

// ── Service roles ────────────────────────────────────────────────────────────

/// Identifies one of the three compose services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceRole {
    Database,
    Cache,
    Server,
}

impl ServiceRole {
    /// All roles in compose declaration order.
    pub const ALL: [ServiceRole; 3] = [Self::Database, Self::Cache, Self::Server];

    /// Compose service name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Cache => "cache",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Manifest {
    /// Image reference for a service.
    #[must_use]
    pub fn image(&self, role: ServiceRole) -> &str {
        match role {
            ServiceRole::Database => &self.services.database.image,
            ServiceRole::Cache => &self.services.cache.image,
            ServiceRole::Server => &self.services.server.image,
        }
    }

    /// Path of the rendered compose file.
    #[must_use]
    pub fn compose_path(&self) -> PathBuf {
        self.output_dir.join(COMPOSE_FILE)
    }

    /// Path of the rendered environment file.
    #[must_use]
    pub fn env_path(&self) -> PathBuf {
        self.output_dir.join(ENV_FILE)
    }

    /// Path of the deployment record.
    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.output_dir.join(STATE_DIR).join("state.json")
    }

    /// Resolve a relative `output_dir` against the manifest's directory.
    pub fn anchor_output_dir(&mut self, manifest_path: &Path) {
        if self.output_dir.is_relative() {
            if let Some(parent) = manifest_path.parent() {
                self.output_dir = parent.join(&self.output_dir);
            }
        }
    }
}

// ── Env catalog ──────────────────────────────────────────────────────────────

/// Ordered `KEY: value` catalog.
///
/// YAML scalars of any type are accepted and kept as their string form, so
/// `PORT: 8080` and `PORT: "8080"` are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvCatalog(pub Vec<(String, String)>);

impl EnvCatalog {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for EnvCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EnvCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = EnvCatalog;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of variable names to scalar values")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(EnvCatalog::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, serde_yaml::Value>()? {
                    let Some(value) = scalar_to_string(&value) else {
                        return Err(de::Error::custom(format!(
                            "env.{key}: value must be a string, number or boolean"
                        )));
                    };
                    entries.push((key, value));
                }
                Ok(EnvCatalog(entries))
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Null => Some(String::new()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

/// Validate a parsed manifest. Returns `Ok(())` or an error listing every
/// violation found.
///
/// # Errors
///
/// Returns [`ManifestError::ValidationFailed`] if any check fails.
pub fn validate_manifest(manifest: &Manifest) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if !PROJECT_RE.is_match(&manifest.project) {
        errors.push(format!(
            "project '{}' must match ^[a-z0-9][a-z0-9_-]*$",
            manifest.project
        ));
    }

    for role in ServiceRole::ALL {
        let image = manifest.image(role);
        if image.trim().is_empty() || image.chars().any(char::is_whitespace) {
            errors.push(format!("services.{role}.image '{image}' is not a valid image reference"));
        }
    }

    for port in &manifest.services.server.ports {
        if !PORT_RE.is_match(port) {
            errors.push(format!("services.server.ports: '{port}' is not a valid port mapping"));
        }
    }

    if let Some(check) = &manifest.services.server.healthcheck {
        if check.test.is_empty() {
            errors.push("services.server.healthcheck.test must not be empty".to_string());
        }
    }

    let db = &manifest.services.database;
    if !ENV_KEY_RE.is_match(&db.password_key) {
        errors.push(format!(
            "services.database.password_key '{}' is not a valid variable name",
            db.password_key
        ));
    }
    if db.user.trim().is_empty() || db.name.trim().is_empty() {
        errors.push("services.database user and name must not be empty".to_string());
    }

    validate_secrets(&manifest.secrets, &mut errors);

    for (key, _) in manifest.env.iter() {
        if !ENV_KEY_RE.is_match(key) {
            errors.push(format!("env.{key}: not a valid variable name"));
        }
    }

    if manifest.health.attempts == 0 {
        errors.push("health.attempts must be at least 1".to_string());
    }
    if manifest.health.interval_secs == 0 {
        errors.push("health.interval_secs must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ManifestError::ValidationFailed(errors.join("\n")).into())
    }
}

fn validate_secrets(secrets: &SecretsConfig, errors: &mut Vec<String>) {
    if secrets.region.is_some() && secrets.provider != SecretProvider::Aws {
        errors.push(format!(
            "secrets.region is not supported by the '{}' provider",
            secrets.provider
        ));
    }
    if secrets.project.is_some() && secrets.provider != SecretProvider::Gcloud {
        errors.push(format!(
            "secrets.project is not supported by the '{}' provider",
            secrets.provider
        ));
    }

    for bundle in &secrets.bundles {
        if bundle.name.trim().is_empty() {
            errors.push("secrets.bundles: name must not be empty".to_string());
        }
        if !bundle.prefix.is_empty() && !ENV_KEY_RE.is_match(&bundle.prefix) {
            errors.push(format!(
                "secrets.bundles[{}].prefix '{}' is not a valid variable name prefix",
                bundle.name, bundle.prefix
            ));
        }
    }

    let mut seen = std::collections::HashSet::new();
    for entry in &secrets.entries {
        if entry.name.trim().is_empty() {
            errors.push("secrets.entries: name must not be empty".to_string());
        }
        if !ENV_KEY_RE.is_match(&entry.key) {
            errors.push(format!(
                "secrets.entries[{}].key '{}' is not a valid variable name",
                entry.name, entry.key
            ));
        }
        if !seen.insert(entry.key.as_str()) {
            errors.push(format!("secrets.entries: key '{}' is bound more than once", entry.key));
        }
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
