//! Environment preparation and rendering through the public service API.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use stackctl_cli::application::services::render::{prepare_environment, render_artifacts};
use stackctl_cli::domain::env::REDACTED;
use stackctl_cli::domain::error::EnvError;

use crate::helpers::{manifest, manifest_from};
use crate::mocks::{MemorySecretStore, MemoryWriter, RecordingReporter, no_host_env};

#[tokio::test]
async fn test_prepare_environment_layers_and_marks_secrets() {
    let m = manifest();
    let env = prepare_environment(
        &m,
        &MemorySecretStore::standard(),
        &RecordingReporter::default(),
        &no_host_env,
    )
    .await
    .unwrap();

    assert_eq!(env.get("API_TOKEN"), Some("tok-123"));
    assert!(env.is_secret("API_TOKEN"));
    assert_eq!(env.get("SMTP_PORT"), Some("587"));
    assert_eq!(env.get("FEATURE_X"), Some("true"));
    assert_eq!(env.get("APP_URL"), Some("https://acme.example.com"));
    assert!(!env.is_secret("APP_URL"));
    assert_eq!(env.get("POSTGRES_USER"), Some("acme"));
    assert_eq!(env.get("REDIS_URL"), Some("redis://cache:6379/0"));
    assert!(env.is_secret("DATABASE_URL"));

    let redacted = env.redacted();
    let token = redacted.iter().find(|(k, _)| *k == "API_TOKEN").unwrap();
    assert_eq!(token.1, REDACTED);
    let level = redacted.iter().find(|(k, _)| *k == "LOG_LEVEL").unwrap();
    assert_eq!(level.1, "info");
}

#[tokio::test]
async fn test_catalog_overrides_derived_database_url() {
    let yaml = crate::helpers::MANIFEST_YAML.replace(
        "  LOG_LEVEL: info\n",
        "  LOG_LEVEL: info\n  DATABASE_URL: postgres://external/acme\n",
    );
    let m = manifest_from(&yaml);
    let env = prepare_environment(
        &m,
        &MemorySecretStore::standard(),
        &RecordingReporter::default(),
        &no_host_env,
    )
    .await
    .unwrap();

    assert_eq!(env.get("DATABASE_URL"), Some("postgres://external/acme"));
    assert!(!env.is_secret("DATABASE_URL"));
}

#[tokio::test]
async fn test_host_reference_resolves_from_lookup() {
    let yaml = crate::helpers::MANIFEST_YAML.replace(
        "  LOG_LEVEL: info\n",
        "  LOG_LEVEL: \"${env:DEPLOY_LOG_LEVEL}\"\n",
    );
    let m = manifest_from(&yaml);
    let host = |key: &str| (key == "DEPLOY_LOG_LEVEL").then(|| "debug".to_string());
    let env = prepare_environment(
        &m,
        &MemorySecretStore::standard(),
        &RecordingReporter::default(),
        &host,
    )
    .await
    .unwrap();
    assert_eq!(env.get("LOG_LEVEL"), Some("debug"));

    let err = prepare_environment(
        &m,
        &MemorySecretStore::standard(),
        &RecordingReporter::default(),
        &no_host_env,
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.downcast_ref::<EnvError>(),
        Some(&EnvError::UnresolvedHostVar {
            var: "LOG_LEVEL".to_string(),
            key: "DEPLOY_LOG_LEVEL".to_string(),
        })
    );
}

#[tokio::test]
async fn test_render_artifacts_reports_hash_of_written_compose() {
    let m = manifest();
    let env = prepare_environment(
        &m,
        &MemorySecretStore::standard(),
        &RecordingReporter::default(),
        &no_host_env,
    )
    .await
    .unwrap();
    let writer = MemoryWriter::default();
    let reporter = RecordingReporter::default();

    let report = render_artifacts(&m, &env, &writer, &reporter).unwrap();

    let (compose, _) = writer.file(&report.compose_path).unwrap();
    assert_eq!(
        report.compose_sha256,
        stackctl_cli::domain::deployment::sha256_hex(compose.as_bytes())
    );
    assert!(compose.contains("condition: service_healthy"));
    assert_eq!(report.variables, env.len());
    assert!(reporter.events().iter().any(|e| e.starts_with("ok: rendered")));
}
