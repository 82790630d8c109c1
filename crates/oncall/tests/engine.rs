mod common;

use common::{test_db, RecordingCommenter};
use database::{assignment, EscalationStatus, Rotation, User};
use oncall::{Command, OnCallEngine, Target};

const REPO: &str = "acme/repo";

fn engine(db: &database::Database, commenter: &std::sync::Arc<RecordingCommenter>) -> OnCallEngine {
    OnCallEngine::new(db.clone(), commenter.clone())
}

fn add_user(handle: &str, name: &str) -> Command {
    Command::AddUser {
        handle: handle.to_string(),
        name: name.to_string(),
    }
}

fn add_rotation(name: &str) -> Command {
    Command::AddRotation {
        name: name.to_string(),
    }
}

fn assign(handle: &str, rotation: &str) -> Command {
    Command::AssignUser {
        handle: handle.to_string(),
        rotation: rotation.to_string(),
    }
}

#[tokio::test]
async fn test_first_ack_provisions_everything() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let engine = engine(&db, &commenter);

    let reply = engine
        .execute(REPO, Target::Issue(42), "alice", &Command::Acknowledge)
        .await
        .unwrap();
    assert_eq!(reply.as_deref(), Some("@alice has acknowledged this issue."));

    let alice = db.users().find_by_handle("alice").await.unwrap().unwrap();
    assert!(alice.is_active);

    let rotations = db.rotations().find_by_repository(REPO).await.unwrap();
    assert_eq!(rotations.len(), 1);
    assert_eq!(rotations[0].name, "acme/repo Default Rotation");

    let assignments = db.assignments().find_by_rotation(&rotations[0].id).await.unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].user_id, alice.id);
    assert!(assignments[0].is_current);

    let escalation = db.escalations().find_by_issue(REPO, 42).await.unwrap().unwrap();
    assert_eq!(escalation.status, EscalationStatus::Acknowledged);
    assert_eq!(escalation.assignment_id.as_deref(), Some(assignments[0].id.as_str()));

    let posted = commenter.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].repository, REPO);
    assert_eq!(posted[0].number, 42);
    assert!(posted[0].body.contains("@alice"));
}

#[tokio::test]
async fn test_ack_twice_keeps_one_escalation() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let engine = engine(&db, &commenter);

    for _ in 0..2 {
        engine
            .execute(REPO, Target::Issue(42), "alice", &Command::Acknowledge)
            .await
            .unwrap();
    }

    let all = db.escalations().find_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, EscalationStatus::Acknowledged);

    // Second ack changed nothing, so it said nothing
    assert_eq!(commenter.posted().len(), 1);
    assert_eq!(db.users().find_all().await.unwrap().len(), 1);
    assert_eq!(db.assignments().find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_escalate_then_ack_then_resolve() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let engine = engine(&db, &commenter);
    let target = Target::Issue(7);

    // No rotation yet: generic wording, no assignment
    engine.execute(REPO, target, "bob", &Command::Escalate).await.unwrap();
    let escalation = db.escalations().find_by_issue(REPO, 7).await.unwrap().unwrap();
    assert_eq!(escalation.status, EscalationStatus::Escalated);
    assert!(escalation.escalation_time.is_some());
    assert!(escalation.assignment_id.is_none());

    engine.execute(REPO, target, "alice", &Command::Acknowledge).await.unwrap();
    let escalation = db.escalations().find_by_issue(REPO, 7).await.unwrap().unwrap();
    assert_eq!(escalation.status, EscalationStatus::Acknowledged);

    engine.execute(REPO, target, "alice", &Command::Escalate).await.unwrap();
    engine.execute(REPO, target, "alice", &Command::Resolve).await.unwrap();
    let escalation = db.escalations().find_by_issue(REPO, 7).await.unwrap().unwrap();
    assert_eq!(escalation.status, EscalationStatus::Resolved);
    assert!(escalation.resolution_time.is_some());

    // Nothing left to resolve
    let reply = engine.execute(REPO, target, "alice", &Command::Resolve).await.unwrap();
    assert!(reply.is_none());

    assert_eq!(
        commenter.bodies(),
        vec![
            "This issue has been marked for escalation.",
            "@alice has acknowledged this issue.",
            "This issue has been re-escalated.",
            "This issue has been marked as resolved by @alice.",
        ]
    );
    assert_eq!(db.escalations().find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_escalate_targets_current_on_call() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let engine = engine(&db, &commenter);
    let target = Target::Issue(1);

    engine.execute(REPO, target, "admin", &add_user("carol", "Carol C")).await.unwrap();
    engine.execute(REPO, target, "admin", &add_rotation("Primary")).await.unwrap();
    engine.execute(REPO, target, "admin", &assign("carol", "primary")).await.unwrap();

    let reply = engine
        .execute(REPO, Target::Issue(2), "dave", &Command::Escalate)
        .await
        .unwrap();
    assert_eq!(reply.as_deref(), Some("This issue has been escalated to @carol."));

    let escalation = db.escalations().find_by_issue(REPO, 2).await.unwrap().unwrap();
    let current = db.assignments().find_by_id(escalation.assignment_id.as_deref().unwrap()).await.unwrap().unwrap();
    let carol = db.users().find_by_handle("carol").await.unwrap().unwrap();
    assert_eq!(current.user_id, carol.id);
}

#[tokio::test]
async fn test_resolved_issue_opens_new_escalation() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let engine = engine(&db, &commenter);
    let target = Target::Issue(5);

    engine.execute(REPO, target, "alice", &Command::Acknowledge).await.unwrap();
    engine.execute(REPO, target, "alice", &Command::Resolve).await.unwrap();
    engine.execute(REPO, target, "alice", &Command::Acknowledge).await.unwrap();

    let all = db.escalations().find_all().await.unwrap();
    assert_eq!(all.len(), 2);
    let live = db.escalations().find_by_issue(REPO, 5).await.unwrap().unwrap();
    assert_eq!(live.status, EscalationStatus::Acknowledged);
}

#[tokio::test]
async fn test_pull_request_wording_and_lookup() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let engine = engine(&db, &commenter);

    engine
        .execute(REPO, Target::PullRequest(9), "alice", &Command::Acknowledge)
        .await
        .unwrap();

    assert!(db.escalations().find_by_issue(REPO, 9).await.unwrap().is_none());
    let escalation = db.escalations().find_by_pr(REPO, 9).await.unwrap().unwrap();
    assert_eq!(escalation.issue_number, 0);
    assert_eq!(commenter.bodies(), vec!["@alice has acknowledged this pull request."]);
}

#[tokio::test]
async fn test_user_and_rotation_management() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let engine = engine(&db, &commenter);
    let target = Target::Issue(3);

    engine.execute(REPO, target, "admin", &add_user("erin", "Erin E")).await.unwrap();
    engine.execute(REPO, target, "admin", &add_user("erin", "Erin Again")).await.unwrap();
    engine.execute(REPO, target, "admin", &assign("frank", "Primary")).await.unwrap();
    engine.execute(REPO, target, "admin", &assign("erin", "Primary")).await.unwrap();
    engine.execute(REPO, target, "admin", &add_rotation("Primary")).await.unwrap();
    engine.execute(REPO, target, "admin", &add_rotation("PRIMARY")).await.unwrap();
    engine.execute(REPO, target, "admin", &assign("erin", "primary")).await.unwrap();

    assert_eq!(
        commenter.bodies(),
        vec![
            "User @erin has been added to the on-call system.",
            "User @erin already exists.",
            "User @frank does not exist. Please add the user first.",
            "Rotation 'Primary' does not exist. Please create it first.",
            "On-call rotation 'Primary' has been created for this repository.",
            "Rotation 'PRIMARY' already exists.",
            "@erin has been assigned to the 'Primary' on-call rotation.",
        ]
    );

    let erin: User = db.users().find_by_handle("erin").await.unwrap().unwrap();
    assert_eq!(erin.name, "Erin E");

    let rotations: Vec<Rotation> = db.rotations().find_by_repository(REPO).await.unwrap();
    assert_eq!(rotations.len(), 1);
    assert_eq!(rotations[0].description, "Rotation created by @admin");
}

#[tokio::test]
async fn test_reassignment_moves_current_flag() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let engine = engine(&db, &commenter);
    let target = Target::Issue(3);

    engine.execute(REPO, target, "admin", &add_user("erin", "Erin")).await.unwrap();
    engine.execute(REPO, target, "admin", &add_user("gus", "Gus")).await.unwrap();
    engine.execute(REPO, target, "admin", &add_rotation("Primary")).await.unwrap();
    engine.execute(REPO, target, "admin", &assign("erin", "Primary")).await.unwrap();
    engine.execute(REPO, target, "admin", &assign("gus", "Primary")).await.unwrap();

    let rotation = db.rotations().find_by_repository(REPO).await.unwrap().remove(0);
    let gus = db.users().find_by_handle("gus").await.unwrap().unwrap();

    let all = db.assignments().find_by_rotation(&rotation.id).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all.iter().filter(|a| a.is_current).count(), 1);

    let mut conn = db.pool().acquire().await.unwrap();
    let current = assignment::find_current_by_rotation(&mut conn, &rotation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.user_id, gus.id);
}

#[tokio::test]
async fn test_failed_comment_keeps_state() {
    let db = test_db().await;
    let commenter = RecordingCommenter::failing();
    let engine = engine(&db, &commenter);

    let reply = engine
        .execute(REPO, Target::Issue(11), "alice", &Command::Acknowledge)
        .await
        .unwrap();
    assert!(reply.is_some());
    assert_eq!(commenter.posted().len(), 1);

    let escalation = db.escalations().find_by_issue(REPO, 11).await.unwrap().unwrap();
    assert_eq!(escalation.status, EscalationStatus::Acknowledged);
}

#[tokio::test]
async fn test_persistence_failure_posts_nothing() {
    let db = test_db().await;
    let commenter = RecordingCommenter::new();
    let engine = engine(&db, &commenter);

    drop_table(&db, "assignments").await;

    let result = engine
        .execute(REPO, Target::Issue(12), "alice", &Command::Acknowledge)
        .await;
    assert!(result.is_err());
    assert!(commenter.posted().is_empty());

    // User and rotation were written before the assignment insert failed
    assert!(db.users().find_all().await.unwrap().is_empty());
    assert!(db.rotations().find_all().await.unwrap().is_empty());
}

async fn drop_table(db: &database::Database, table: &str) {
    use sqlx::Executor;
    db.pool()
        .execute(format!("DROP TABLE {}", table).as_str())
        .await
        .unwrap();
}

/// A file database, so concurrent transactions contend on real file locks.
async fn file_db(dir: &tempfile::TempDir) -> database::Database {
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("pager.db").display());
    let db = database::Database::connect(&url).await.unwrap();
    db.migrate().await.unwrap();
    db
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_commands_on_distinct_issues_all_persist() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;
    let commenter = RecordingCommenter::new();
    let engine = engine(&db, &commenter);

    let mut tasks = Vec::new();
    for n in 1..=16 {
        let engine = engine.clone();
        tasks.push(tokio::spawn(async move {
            let actor = format!("user{}", n);
            engine
                .execute(REPO, Target::Issue(n), &actor, &Command::Escalate)
                .await
        }));
    }
    for task in tasks {
        let reply = task.await.unwrap().unwrap();
        assert!(reply.is_some());
    }

    let escalated = db
        .escalations()
        .find_by_status(EscalationStatus::Escalated)
        .await
        .unwrap();
    assert_eq!(escalated.len(), 16);
    assert_eq!(commenter.posted().len(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_first_acks_share_one_default_rotation() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;
    let commenter = RecordingCommenter::new();
    let engine = engine(&db, &commenter);

    let mut tasks = Vec::new();
    for n in 1..=8 {
        let engine = engine.clone();
        tasks.push(tokio::spawn(async move {
            let actor = format!("user{}", n);
            engine
                .execute(REPO, Target::Issue(n), &actor, &Command::Acknowledge)
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let rotations = db.rotations().find_by_repository(REPO).await.unwrap();
    assert_eq!(rotations.len(), 1);
    assert_eq!(rotations[0].name, "acme/repo Default Rotation");

    let acknowledged = db
        .escalations()
        .find_by_status(EscalationStatus::Acknowledged)
        .await
        .unwrap();
    assert_eq!(acknowledged.len(), 8);

    // Each ack made its user current in turn; exactly one is left current.
    let mut conn = db.pool().acquire().await.unwrap();
    let all = assignment::find_by_rotation(&mut conn, &rotations[0].id)
        .await
        .unwrap();
    assert_eq!(all.len(), 8);
    assert_eq!(all.iter().filter(|a| a.is_current).count(), 1);
}
