//! Escalation lookups.

use sqlx::SqliteConnection;

use crate::entity::select_list;
use crate::error::{DatabaseError, Result};
use crate::models::{Escalation, EscalationStatus};
use crate::repository::Repository;

/// Which number column an escalation lookup keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberColumn {
    Issue,
    PullRequest,
}

impl NumberColumn {
    fn column(self) -> &'static str {
        match self {
            NumberColumn::Issue => "issue_number",
            NumberColumn::PullRequest => "pr_number",
        }
    }
}

async fn find_by_number(
    conn: &mut SqliteConnection,
    repository: &str,
    column: NumberColumn,
    number: i64,
) -> Result<Option<Escalation>> {
    // Live escalations sort ahead of resolved ones, newest first.
    let sql = format!(
        "SELECT {} FROM escalations WHERE repository = ? AND {} = ? \
         ORDER BY status = 'resolved', created_at DESC LIMIT 1",
        select_list::<Escalation>(),
        column.column()
    );
    sqlx::query_as::<_, Escalation>(&sql)
        .bind(repository)
        .bind(number)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("find", "Escalation", format!("{}#{}", repository, number), e))
}

/// The escalation for an issue, preferring a live one over resolved history.
pub async fn find_by_issue(
    conn: &mut SqliteConnection,
    repository: &str,
    issue_number: i64,
) -> Result<Option<Escalation>> {
    find_by_number(conn, repository, NumberColumn::Issue, issue_number).await
}

/// The escalation for a pull request, preferring a live one over resolved history.
pub async fn find_by_pr(
    conn: &mut SqliteConnection,
    repository: &str,
    pr_number: i64,
) -> Result<Option<Escalation>> {
    find_by_number(conn, repository, NumberColumn::PullRequest, pr_number).await
}

pub async fn find_by_status(
    conn: &mut SqliteConnection,
    status: EscalationStatus,
) -> Result<Vec<Escalation>> {
    let sql = format!(
        "SELECT {} FROM escalations WHERE status = ? ORDER BY created_at",
        select_list::<Escalation>()
    );
    sqlx::query_as::<_, Escalation>(&sql)
        .bind(status)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("find", "Escalation", status.as_str(), e))
}

pub async fn find_by_assignment(
    conn: &mut SqliteConnection,
    assignment_id: &str,
) -> Result<Vec<Escalation>> {
    let sql = format!(
        "SELECT {} FROM escalations WHERE assignment_id = ? ORDER BY created_at",
        select_list::<Escalation>()
    );
    sqlx::query_as::<_, Escalation>(&sql)
        .bind(assignment_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("find", "Escalation", assignment_id, e))
}

impl Repository<Escalation> {
    pub async fn find_by_issue(&self, repository: &str, issue_number: i64) -> Result<Option<Escalation>> {
        let mut conn = self.acquire().await?;
        find_by_issue(&mut conn, repository, issue_number).await
    }

    pub async fn find_by_pr(&self, repository: &str, pr_number: i64) -> Result<Option<Escalation>> {
        let mut conn = self.acquire().await?;
        find_by_pr(&mut conn, repository, pr_number).await
    }

    pub async fn find_by_status(&self, status: EscalationStatus) -> Result<Vec<Escalation>> {
        let mut conn = self.acquire().await?;
        find_by_status(&mut conn, status).await
    }

    pub async fn find_by_assignment(&self, assignment_id: &str) -> Result<Vec<Escalation>> {
        let mut conn = self.acquire().await?;
        find_by_assignment(&mut conn, assignment_id).await
    }
}
