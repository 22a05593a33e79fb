//! Tests for the one-shot status use-case.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use stackctl_cli::application::services::status::stack_status;
use stackctl_cli::domain::deployment::DeploymentRecord;
use stackctl_cli::domain::health::ServiceHealth;

use crate::helpers::{PS_DATABASE_EXITED, PS_ALL_HEALTHY, err_output, manifest, ok_output};
use crate::mocks::{EngineRecorder, MemoryDeploymentStore};

#[tokio::test]
async fn test_status_all_ready_with_record() {
    let m = manifest();
    let when = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let record = DeploymentRecord::new(&m, 10, "ab".repeat(32), when);
    let state = MemoryDeploymentStore::with(record.clone());
    let runner = EngineRecorder::new(vec![ok_output(PS_ALL_HEALTHY)]);

    let status = stack_status(&runner, &m, &state).await.unwrap();

    assert!(status.all_ready());
    assert_eq!(status.project, "acme");
    let names: Vec<_> = status.services.iter().map(|s| s.service).collect();
    assert_eq!(names, ["database", "cache", "server"]);
    assert_eq!(status.services[2].image, "ghcr.io/acme/server:1.4.2");
    assert_eq!(status.last_deploy, Some(record));

    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["services"][0]["health"]["status"], "ready");
    assert_eq!(json["last_deploy"]["deployed_at"], "2026-03-01T12:00:00Z");
}

#[tokio::test]
async fn test_status_reports_missing_and_exited_services() {
    let m = manifest();
    let runner = EngineRecorder::new(vec![ok_output(PS_DATABASE_EXITED)]);

    let status = stack_status(&runner, &m, &MemoryDeploymentStore::default())
        .await
        .unwrap();

    assert!(!status.all_ready());
    assert!(matches!(status.services[0].health, ServiceHealth::Exited(_)));
    assert_eq!(status.services[1].health, ServiceHealth::Ready);
    assert_eq!(
        status.services[2].health,
        ServiceHealth::Pending("not created".to_string())
    );
    assert!(status.last_deploy.is_none());
}

#[tokio::test]
async fn test_status_propagates_compose_failure() {
    let m = manifest();
    let runner = EngineRecorder::new(vec![err_output(1, b"no configuration file provided")]);

    let err = stack_status(&runner, &m, &MemoryDeploymentStore::default())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("no configuration file provided"), "{err:#}");
}
