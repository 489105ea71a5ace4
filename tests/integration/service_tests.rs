//! Service-level tests against on-disk storage

use std::sync::Arc;

use tokio_test::{assert_err, assert_ok};

use toolwatch_server::{
    clock::ManualClock,
    config::AuthConfig,
    models::{
        credential::CredentialInput,
        event::{HistoryQuery, ReportIssue},
        timestamp, ToolStatus,
    },
    repository::Repository,
    services::Services,
    storage::{FileStorage, Storage},
    AppError,
};

async fn services_on(dir: &std::path::Path) -> Services {
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(dir).await.unwrap());
    let repository = Repository::load(storage, true).await;
    let clock = ManualClock::new(timestamp::parse("2023-04-10T12:00").unwrap());
    let services = Services::new(repository, Arc::new(clock), AuthConfig::default());
    services.status.recompute().await;
    services
}

#[tokio::test]
async fn state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    let services = services_on(dir.path()).await;
    let tool = assert_ok!(services.tools.create("SEM-01").await);
    assert_ok!(
        services
            .history
            .report_issue(
                tool.id,
                ReportIssue {
                    description: "Stage drift".to_string(),
                    screenshots: vec!["drift.png".to_string()],
                },
                "lead",
            )
            .await
    );
    drop(services);

    let restarted = services_on(dir.path()).await;
    let tool = assert_ok!(restarted.tools.get_by_id(tool.id).await);
    assert_eq!(tool.status(), ToolStatus::Down);

    let history = assert_ok!(restarted.history.for_tool(tool.id, HistoryQuery::default()).await);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].screenshots, vec!["drift.png".to_string()]);

    // The demo seed is not applied twice
    assert_eq!(restarted.tools.list().await.len(), 6);
}

#[tokio::test]
async fn credentials_follow_a_renamed_tool() {
    let dir = tempfile::tempdir().unwrap();
    let services = services_on(dir.path()).await;

    let tool = assert_ok!(services.tools.create("SEM-01").await);
    assert_ok!(
        services
            .credentials
            .create(
                tool.id,
                CredentialInput {
                    system: "Support PC".to_string(),
                    username: "microscope".to_string(),
                    password: "s3cret".to_string(),
                },
            )
            .await
    );
    assert_ok!(services.tools.rename(tool.id, "SEM-02").await);
    drop(services);

    let restarted = services_on(dir.path()).await;
    let credentials = assert_ok!(restarted.credentials.list(tool.id).await);
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0].system, "Support PC");
}

#[tokio::test]
async fn unknown_tool_is_reported_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let services = services_on(dir.path()).await;

    let err = assert_err!(services.tools.rename(404, "Nowhere").await);
    assert!(matches!(err, AppError::NotFound(_)));
    let err = assert_err!(services.credentials.list(404).await);
    assert!(matches!(err, AppError::NotFound(_)));
}
