//! What a command or sweep acts on: an issue or a pull request.

use std::fmt;

use database::{escalation, Escalation, EscalationStatus, Result, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Issue(i64),
    PullRequest(i64),
}

impl Target {
    /// The escalation's target, preferring the issue number when both are set.
    /// None when neither is.
    pub fn of(escalation: &Escalation) -> Option<Target> {
        if escalation.issue_number != 0 {
            Some(Target::Issue(escalation.issue_number))
        } else if escalation.pr_number != 0 {
            Some(Target::PullRequest(escalation.pr_number))
        } else {
            None
        }
    }

    pub fn number(&self) -> i64 {
        match self {
            Target::Issue(n) | Target::PullRequest(n) => *n,
        }
    }

    /// Noun used in comments.
    pub fn noun(&self) -> &'static str {
        match self {
            Target::Issue(_) => "issue",
            Target::PullRequest(_) => "pull request",
        }
    }

    /// The live escalation for this target, if any. Resolved history is
    /// ignored.
    pub async fn live_escalation(
        &self,
        tx: &mut Transaction,
        repository: &str,
    ) -> Result<Option<Escalation>> {
        let found = match self {
            Target::Issue(n) => escalation::find_by_issue(tx.conn(), repository, *n).await?,
            Target::PullRequest(n) => escalation::find_by_pr(tx.conn(), repository, *n).await?,
        };
        Ok(found.filter(|e| !e.status.is_terminal()))
    }

    /// A new, unsaved escalation for this target.
    pub fn new_escalation(&self, repository: &str, status: EscalationStatus) -> Escalation {
        match self {
            Target::Issue(n) => Escalation::for_issue(repository, *n, status),
            Target::PullRequest(n) => Escalation::for_pr(repository, *n, status),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Issue(n) => write!(f, "issue #{}", n),
            Target::PullRequest(n) => write!(f, "pull request #{}", n),
        }
    }
}
