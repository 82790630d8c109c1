#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use database::Database;
use github_client::{GitHubError, IssueCommenter};

/// One posted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted {
    pub repository: String,
    pub number: i64,
    pub body: String,
}

/// Records comments instead of posting them.
#[derive(Default)]
pub struct RecordingCommenter {
    posted: Mutex<Vec<Posted>>,
    fail: bool,
}

impl RecordingCommenter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A commenter whose every post fails (after recording the attempt).
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            posted: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn posted(&self) -> Vec<Posted> {
        self.posted.lock().unwrap().clone()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.posted().into_iter().map(|p| p.body).collect()
    }
}

#[async_trait]
impl IssueCommenter for RecordingCommenter {
    async fn post_comment(&self, repository: &str, number: i64, body: &str) -> Result<(), GitHubError> {
        self.posted.lock().unwrap().push(Posted {
            repository: repository.to_string(),
            number,
            body: body.to_string(),
        });
        if self.fail {
            return Err(GitHubError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        Ok(())
    }
}

pub async fn test_db() -> Database {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    db
}

/// Build an `issue_comment` delivery body.
pub fn issue_comment(repo: &str, number: i64, login: &str, body: &str) -> Vec<u8> {
    serde_json::json!({
        "action": "created",
        "issue": {"number": number, "title": "Something broke"},
        "comment": {"body": body, "user": {"login": login}},
        "repository": {"full_name": repo},
    })
    .to_string()
    .into_bytes()
}

/// Build a `pull_request_review_comment` delivery body.
pub fn review_comment(repo: &str, number: i64, login: &str, body: &str) -> Vec<u8> {
    serde_json::json!({
        "action": "created",
        "pull_request": {"number": number, "title": "Fix it"},
        "comment": {"body": body, "user": {"login": login}},
        "repository": {"full_name": repo},
    })
    .to_string()
    .into_bytes()
}
