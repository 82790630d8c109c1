//! Webhook payload types.
//!
//! Only the fields Pager reads are modelled; everything else in the payload
//! is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GitHubError;

/// A GitHub account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

/// Repository the event happened in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/name`.
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: i64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: i64,
    #[serde(default)]
    pub title: String,
}

/// An issue comment or pull request review comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub body: String,
    pub user: Account,
}

/// `issues` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuesEvent {
    pub action: String,
    pub issue: Issue,
    pub repository: Repository,
}

/// `issue_comment` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCommentEvent {
    pub action: String,
    pub issue: Issue,
    pub comment: Comment,
    pub repository: Repository,
}

/// `pull_request` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub pull_request: PullRequest,
    pub repository: Repository,
}

/// `pull_request_review_comment` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestReviewCommentEvent {
    pub action: String,
    pub pull_request: PullRequest,
    pub comment: Comment,
    pub repository: Repository,
}

/// `ping` event sent when a webhook is first configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingEvent {
    #[serde(default)]
    pub zen: Option<String>,
}

/// A classified webhook delivery.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    Issues(IssuesEvent),
    IssueComment(IssueCommentEvent),
    PullRequest(PullRequestEvent),
    PullRequestReviewComment(PullRequestReviewCommentEvent),
    Ping(PingEvent),
    /// Any event type Pager has no typed payload for. Passed through so
    /// handlers can decide to ignore it.
    Other { event_type: String, payload: Value },
}

impl WebhookEvent {
    /// Parse a delivery from its `X-GitHub-Event` value and raw body.
    ///
    /// Unknown event types are not an error, but the body must still be JSON.
    pub fn parse(event_type: &str, body: &[u8]) -> Result<Self, GitHubError> {
        let payload_error = |source| GitHubError::Payload {
            event_type: event_type.to_string(),
            source,
        };

        let event = match event_type {
            "issues" => WebhookEvent::Issues(serde_json::from_slice(body).map_err(payload_error)?),
            "issue_comment" => {
                WebhookEvent::IssueComment(serde_json::from_slice(body).map_err(payload_error)?)
            }
            "pull_request" => {
                WebhookEvent::PullRequest(serde_json::from_slice(body).map_err(payload_error)?)
            }
            "pull_request_review_comment" => WebhookEvent::PullRequestReviewComment(
                serde_json::from_slice(body).map_err(payload_error)?,
            ),
            "ping" => WebhookEvent::Ping(serde_json::from_slice(body).map_err(payload_error)?),
            other => WebhookEvent::Other {
                event_type: other.to_string(),
                payload: serde_json::from_slice(body).map_err(payload_error)?,
            },
        };

        Ok(event)
    }

    /// The event type as GitHub names it.
    pub fn event_type(&self) -> &str {
        match self {
            WebhookEvent::Issues(_) => "issues",
            WebhookEvent::IssueComment(_) => "issue_comment",
            WebhookEvent::PullRequest(_) => "pull_request",
            WebhookEvent::PullRequestReviewComment(_) => "pull_request_review_comment",
            WebhookEvent::Ping(_) => "ping",
            WebhookEvent::Other { event_type, .. } => event_type,
        }
    }

    /// Repository the event belongs to, if the payload names one.
    pub fn repository(&self) -> Option<&str> {
        match self {
            WebhookEvent::Issues(e) => Some(&e.repository.full_name),
            WebhookEvent::IssueComment(e) => Some(&e.repository.full_name),
            WebhookEvent::PullRequest(e) => Some(&e.repository.full_name),
            WebhookEvent::PullRequestReviewComment(e) => Some(&e.repository.full_name),
            WebhookEvent::Ping(_) => None,
            WebhookEvent::Other { payload, .. } => payload
                .get("repository")
                .and_then(|r| r.get("full_name"))
                .and_then(Value::as_str),
        }
    }
}
