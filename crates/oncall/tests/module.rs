mod common;

use std::sync::Arc;

use common::{issue_comment, review_comment, test_db, RecordingCommenter};
use database::EscalationStatus;
use github_client::WebhookEvent;
use module_core::{Dispatcher, Module, ModuleRegistry};
use oncall::{OnCallConfig, OnCallModule, MODULE_NAME};

const REPO: &str = "acme/repo";

async fn deliver(module: &OnCallModule, event_type: &str, raw: &[u8]) {
    let event = WebhookEvent::parse(event_type, raw).unwrap();
    module.handle_event(&event, raw).await.unwrap();
}

#[tokio::test]
async fn test_ack_comment_scenario() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let module = OnCallModule::new(OnCallConfig::default(), db.clone(), commenter.clone());

    deliver(&module, "issue_comment", &issue_comment(REPO, 42, "alice", "/ack")).await;

    let alice = db.users().find_by_handle("alice").await.unwrap().unwrap();
    let rotations = db.rotations().find_by_repository(REPO).await.unwrap();
    assert_eq!(rotations.len(), 1);
    assert_eq!(rotations[0].name, "acme/repo Default Rotation");

    let current = db
        .assignments()
        .find_current_by_rotation(&rotations[0].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.user_id, alice.id);

    let escalation = db.escalations().find_by_issue(REPO, 42).await.unwrap().unwrap();
    assert_eq!(escalation.status, EscalationStatus::Acknowledged);

    let posted = commenter.posted();
    assert_eq!(posted.len(), 1);
    assert!(posted[0].body.contains("@alice"));
}

#[tokio::test]
async fn test_unknown_and_ignored_events_change_nothing() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let module = OnCallModule::new(OnCallConfig::default(), db.clone(), commenter.clone());

    deliver(&module, "push", br#"{"ref": "refs/heads/main", "repository": {"full_name": "acme/repo"}}"#).await;
    deliver(&module, "ping", br#"{"zen": "Design for failure."}"#).await;
    deliver(&module, "issue_comment", &issue_comment(REPO, 1, "alice", "looks good to me")).await;

    // Edited comments are not commands
    let edited = String::from_utf8(issue_comment(REPO, 1, "alice", "/ack"))
        .unwrap()
        .replace("\"created\"", "\"edited\"");
    deliver(&module, "issue_comment", edited.as_bytes()).await;

    // Management commands are not accepted on review comments
    deliver(
        &module,
        "pull_request_review_comment",
        &review_comment(REPO, 3, "alice", "/oncall add rotation Review"),
    )
    .await;

    deliver(
        &module,
        "issues",
        br#"{"action": "opened", "issue": {"number": 5, "title": "Down"}, "repository": {"full_name": "acme/repo"}}"#,
    )
    .await;

    assert!(db.users().find_all().await.unwrap().is_empty());
    assert!(db.rotations().find_all().await.unwrap().is_empty());
    assert!(db.escalations().find_all().await.unwrap().is_empty());
    assert!(commenter.posted().is_empty());
}

#[tokio::test]
async fn test_review_comment_targets_pull_request() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let module = OnCallModule::new(OnCallConfig::default(), db.clone(), commenter.clone());

    deliver(
        &module,
        "pull_request_review_comment",
        &review_comment(REPO, 77, "bob", "/escalate"),
    )
    .await;

    let escalation = db.escalations().find_by_pr(REPO, 77).await.unwrap().unwrap();
    assert_eq!(escalation.status, EscalationStatus::Escalated);
    assert_eq!(commenter.posted()[0].number, 77);
    assert_eq!(
        commenter.bodies(),
        vec!["This pull request has been marked for escalation."]
    );
}

#[tokio::test]
async fn test_disabled_repository_is_ignored() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let config = OnCallConfig {
        enabled_repositories: vec!["acme/other".to_string()],
        ..Default::default()
    };
    let module = OnCallModule::new(config, db.clone(), commenter.clone());

    deliver(&module, "issue_comment", &issue_comment(REPO, 42, "alice", "/ack")).await;
    deliver(&module, "issue_comment", &issue_comment("acme/other", 42, "alice", "/ack")).await;

    assert!(db.escalations().find_by_issue(REPO, 42).await.unwrap().is_none());
    assert!(db.escalations().find_by_issue("acme/other", 42).await.unwrap().is_some());
    assert_eq!(commenter.posted().len(), 1);
}

#[tokio::test]
async fn test_lifecycle_through_registry() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let module = Arc::new(OnCallModule::new(
        OnCallConfig::default(),
        db.clone(),
        commenter.clone(),
    ));

    let registry = Arc::new(ModuleRegistry::new());
    assert!(registry.register(module.clone()));
    assert!(registry.get(MODULE_NAME).is_some());

    registry.initialize_all().await.unwrap();
    assert!(module.is_sweeping().await);

    let dispatcher = Dispatcher::new(registry.clone());
    let raw = issue_comment(REPO, 9, "alice", "/ack");
    let event = WebhookEvent::parse("issue_comment", &raw).unwrap();
    assert_eq!(dispatcher.dispatch(event, raw), 1);
    assert!(dispatcher.drain(std::time::Duration::from_secs(5)).await);

    assert!(db.escalations().find_by_issue(REPO, 9).await.unwrap().is_some());

    assert!(registry.shutdown_all().await.is_empty());
    assert!(!module.is_sweeping().await);
    // Second shutdown is a no-op
    module.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_initialize_fails_without_schema() {
    let db = database::Database::connect("sqlite::memory:").await.unwrap();
    let module = OnCallModule::new(OnCallConfig::default(), db, RecordingCommenter::new());
    assert!(module.initialize().await.is_err());
    assert!(!module.is_sweeping().await);
}
