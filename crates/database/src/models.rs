//! Database models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A person who can be put on call, identified by their platform handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Opaque identifier, assigned on create when empty.
    pub id: String,
    /// Platform login (e.g., "alice"). Unique.
    pub handle: String,
    /// Display name
    pub name: String,
    /// Contact address, may be empty.
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an active user with no contact address.
    pub fn new(handle: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            handle: handle.into(),
            name: name.into(),
            email: String::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A named on-call schedule scoped to one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Rotation {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Owning repository in `owner/name` form.
    pub repository: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rotation {
    /// Create an active rotation for a repository.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name: name.into(),
            description: description.into(),
            repository: repository.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A binding of one user to one rotation.
///
/// At most one assignment per rotation has `is_current` set; the store clears
/// the flag on siblings whenever a current assignment is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: String,
    pub rotation_id: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    /// Create an assignment starting now.
    pub fn new(rotation_id: impl Into<String>, user_id: impl Into<String>, is_current: bool) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            rotation_id: rotation_id.into(),
            user_id: user_id.into(),
            start_time: now,
            end_time: None,
            is_current,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Lifecycle state of an escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EscalationStatus {
    /// Waiting for someone to acknowledge.
    Pending,
    /// Someone on call has taken it.
    Acknowledged,
    /// Raised to the current on-call person, manually or by the sweeper.
    Escalated,
    /// Closed. Terminal.
    Resolved,
}

impl EscalationStatus {
    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationStatus::Pending => "pending",
            EscalationStatus::Acknowledged => "acknowledged",
            EscalationStatus::Escalated => "escalated",
            EscalationStatus::Resolved => "resolved",
        }
    }

    /// Whether an escalation in this state may move to `next`.
    ///
    /// `Escalated -> Escalated` is allowed so a re-escalation can refresh the
    /// escalation time. Nothing leaves `Resolved`.
    pub fn can_transition_to(&self, next: EscalationStatus) -> bool {
        use EscalationStatus::*;
        match (self, next) {
            (Resolved, _) => false,
            (_, Resolved) => true,
            (Pending, Acknowledged) | (Pending, Escalated) => true,
            (Acknowledged, Escalated) => true,
            (Escalated, Acknowledged) | (Escalated, Escalated) => true,
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EscalationStatus::Resolved)
    }
}

impl fmt::Display for EscalationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EscalationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EscalationStatus::Pending),
            "acknowledged" => Ok(EscalationStatus::Acknowledged),
            "escalated" => Ok(EscalationStatus::Escalated),
            "resolved" => Ok(EscalationStatus::Resolved),
            other => Err(format!("unknown escalation status: {}", other)),
        }
    }
}

/// The tracked on-call handling of an issue or pull request.
///
/// A zero `issue_number` or `pr_number` means "not set".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Escalation {
    pub id: String,
    pub assignment_id: Option<String>,
    pub issue_number: i64,
    pub pr_number: i64,
    pub repository: String,
    pub status: EscalationStatus,
    pub escalation_time: Option<DateTime<Utc>>,
    pub resolution_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Escalation {
    /// Create an escalation for an issue.
    pub fn for_issue(repository: impl Into<String>, issue_number: i64, status: EscalationStatus) -> Self {
        Self::new(repository.into(), issue_number, 0, status)
    }

    /// Create an escalation for a pull request.
    pub fn for_pr(repository: impl Into<String>, pr_number: i64, status: EscalationStatus) -> Self {
        Self::new(repository.into(), 0, pr_number, status)
    }

    fn new(repository: String, issue_number: i64, pr_number: i64, status: EscalationStatus) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            assignment_id: None,
            issue_number,
            pr_number,
            repository,
            status,
            escalation_time: (status == EscalationStatus::Escalated).then_some(now),
            resolution_time: (status == EscalationStatus::Resolved).then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `next`, stamping the escalation or resolution time.
    ///
    /// Returns false and leaves the record untouched if the transition is not
    /// allowed from the current status.
    #[must_use]
    pub fn transition(&mut self, next: EscalationStatus, at: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        match next {
            EscalationStatus::Escalated => self.escalation_time = Some(at),
            EscalationStatus::Resolved => self.resolution_time = Some(at),
            _ => {}
        }
        self.status = next;
        true
    }
}
