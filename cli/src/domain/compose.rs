//! Compose file model and rendering.
//!
//! The file is built from typed structs and serialized with `serde_yaml`, so
//! there is no string templating and no secret ever lands in it: services
//! read their variables from the sibling `.env` file.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::manifest::{ENV_FILE, HealthcheckSpec, Manifest, ServiceRole};

const RESTART_POLICY: &str = "unless-stopped";
const DB_VOLUME: &str = "db-data";
const CACHE_VOLUME: &str = "cache-data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeFile {
    pub name: String,
    pub services: ComposeServices,
    pub volumes: BTreeMap<String, serde_yaml::Mapping>,
}

/// Services in declaration order: dependencies first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeServices {
    pub database: ComposeService,
    pub cache: ComposeService,
    pub server: ComposeService,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeService {
    pub image: String,
    pub restart: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_file: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<Healthcheck>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub depends_on: BTreeMap<String, DependsOn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Healthcheck {
    pub test: Vec<String>,
    pub interval: String,
    pub timeout: String,
    pub retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_period: Option<String>,
}

impl From<&HealthcheckSpec> for Healthcheck {
    fn from(check: &HealthcheckSpec) -> Self {
        Self {
            test: check.test.clone(),
            interval: check.interval.clone(),
            timeout: check.timeout.clone(),
            retries: check.retries,
            start_period: check.start_period.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependsOn {
    pub condition: String,
}

fn cmd(args: &[&str]) -> Vec<String> {
    std::iter::once("CMD")
        .chain(args.iter().copied())
        .map(str::to_owned)
        .collect()
}

/// Build the compose model for a manifest.
#[must_use]
pub fn build_compose(manifest: &Manifest) -> ComposeFile {
    let db = &manifest.services.database;
    let server = &manifest.services.server;

    let database = ComposeService {
        image: db.image.clone(),
        restart: RESTART_POLICY.to_string(),
        env_file: vec![ENV_FILE.to_string()],
        ports: Vec::new(),
        volumes: vec![format!("{DB_VOLUME}:/var/lib/postgresql/data")],
        healthcheck: Some(Healthcheck {
            test: cmd(&["pg_isready", "-U", &db.user, "-d", &db.name]),
            interval: "5s".to_string(),
            timeout: "5s".to_string(),
            retries: 20,
            start_period: None,
        }),
        depends_on: BTreeMap::new(),
    };

    let cache = ComposeService {
        image: manifest.services.cache.image.clone(),
        restart: RESTART_POLICY.to_string(),
        env_file: Vec::new(),
        ports: Vec::new(),
        volumes: vec![format!("{CACHE_VOLUME}:/data")],
        healthcheck: Some(Healthcheck {
            test: cmd(&["redis-cli", "ping"]),
            interval: "5s".to_string(),
            timeout: "3s".to_string(),
            retries: 20,
            start_period: None,
        }),
        depends_on: BTreeMap::new(),
    };

    let depends_on = [ServiceRole::Database, ServiceRole::Cache]
        .into_iter()
        .map(|role| {
            (
                role.as_str().to_string(),
                DependsOn {
                    condition: "service_healthy".to_string(),
                },
            )
        })
        .collect();

    let server = ComposeService {
        image: server.image.clone(),
        restart: RESTART_POLICY.to_string(),
        env_file: vec![ENV_FILE.to_string()],
        ports: server.ports.clone(),
        volumes: Vec::new(),
        healthcheck: server.healthcheck.as_ref().map(Healthcheck::from),
        depends_on,
    };

    let volumes = [DB_VOLUME, CACHE_VOLUME]
        .into_iter()
        .map(|v| (v.to_string(), serde_yaml::Mapping::new()))
        .collect();

    ComposeFile {
        name: manifest.project.clone(),
        services: ComposeServices {
            database,
            cache,
            server,
        },
        volumes,
    }
}

/// Serialize the compose model to YAML with a generated-file header.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn render_compose_yaml(compose: &ComposeFile) -> Result<String> {
    let body = serde_yaml::to_string(compose).context("serializing compose file")?;
    Ok(format!(
        "# Generated by stackctl for project '{}'. Do not edit.\n{body}",
        compose.name
    ))
}
