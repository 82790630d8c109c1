//! Command execution against persisted on-call state.
//!
//! Every command runs in one transaction: all lookups and writes commit
//! together or not at all, and the reply comment is posted only after the
//! commit succeeds.

use std::sync::Arc;

use chrono::Utc;
use database::{
    assignment, rotation, user, Assignment, Database, EscalationStatus, Rotation, Transaction,
    User,
};
use github_client::IssueCommenter;
use tracing::info;

use crate::command::Command;
use crate::error::OnCallError;
use crate::notify;
use crate::target::Target;

/// Executes comment commands.
#[derive(Clone)]
pub struct OnCallEngine {
    db: Database,
    commenter: Arc<dyn IssueCommenter>,
}

impl OnCallEngine {
    pub fn new(db: Database, commenter: Arc<dyn IssueCommenter>) -> Self {
        Self { db, commenter }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Run `command`, issued by `actor` on `target` in `repository`.
    ///
    /// Returns the reply that was posted, or None when the command had
    /// nothing to do (for example `/resolve` with no open escalation).
    /// A persistence failure rolls the command back and posts nothing.
    pub async fn execute(
        &self,
        repository: &str,
        target: Target,
        actor: &str,
        command: &Command,
    ) -> Result<Option<String>, OnCallError> {
        let mut tx = self.db.begin().await?;

        let reply = match command {
            Command::Acknowledge => acknowledge(&mut tx, repository, target, actor).await?,
            Command::Escalate => escalate(&mut tx, repository, target).await?,
            Command::Resolve => resolve(&mut tx, repository, target, actor).await?,
            Command::AddUser { handle, name } => Some(add_user(&mut tx, handle, name).await?),
            Command::AddRotation { name } => {
                Some(add_rotation(&mut tx, repository, name, actor).await?)
            }
            Command::AssignUser { handle, rotation } => {
                Some(assign_user(&mut tx, repository, handle, rotation).await?)
            }
        };

        tx.commit().await?;

        if let Some(body) = &reply {
            info!(repo = %repository, %target, actor = %actor, ?command, "Command applied");
            notify::post(self.commenter.as_ref(), repository, target, body).await;
        }

        Ok(reply)
    }
}

async fn acknowledge(
    tx: &mut Transaction,
    repository: &str,
    target: Target,
    actor: &str,
) -> Result<Option<String>, OnCallError> {
    let reply = format!("@{} has acknowledged this {}.", actor, target.noun());

    if let Some(mut escalation) = target.live_escalation(tx, repository).await? {
        // Already acknowledged: nothing to change or say.
        if escalation.status == EscalationStatus::Acknowledged {
            return Ok(None);
        }
        if !escalation.transition(EscalationStatus::Acknowledged, Utc::now()) {
            return Ok(None);
        }
        tx.update(&mut escalation).await?;
        return Ok(Some(reply));
    }

    let user = find_or_create_user(tx, actor).await?;
    let rotation = find_or_create_default_rotation(tx, repository).await?;

    let mut assignment = Assignment::new(&rotation.id, &user.id, true);
    tx.create(&mut assignment).await?;

    let mut escalation = target.new_escalation(repository, EscalationStatus::Acknowledged);
    escalation.assignment_id = Some(assignment.id.clone());
    tx.create(&mut escalation).await?;

    Ok(Some(reply))
}

async fn escalate(
    tx: &mut Transaction,
    repository: &str,
    target: Target,
) -> Result<Option<String>, OnCallError> {
    if let Some(mut escalation) = target.live_escalation(tx, repository).await? {
        if !escalation.transition(EscalationStatus::Escalated, Utc::now()) {
            return Ok(None);
        }
        tx.update(&mut escalation).await?;
        return Ok(Some(format!("This {} has been re-escalated.", target.noun())));
    }

    let mut escalation = target.new_escalation(repository, EscalationStatus::Escalated);

    // Attribute to whoever is current on the repository's first rotation.
    let mut on_call = None;
    let rotations = rotation::find_by_repository(tx.conn(), repository).await?;
    if let Some(rotation) = rotations.first() {
        if let Some(current) = assignment::find_current_by_rotation(tx.conn(), &rotation.id).await? {
            on_call = tx
                .find_by_id::<User>(&current.user_id)
                .await?
                .map(|u| u.handle);
            escalation.assignment_id = Some(current.id);
        }
    }

    tx.create(&mut escalation).await?;

    let reply = match on_call {
        Some(handle) => format!("This {} has been escalated to @{}.", target.noun(), handle),
        None => format!("This {} has been marked for escalation.", target.noun()),
    };
    Ok(Some(reply))
}

async fn resolve(
    tx: &mut Transaction,
    repository: &str,
    target: Target,
    actor: &str,
) -> Result<Option<String>, OnCallError> {
    let Some(mut escalation) = target.live_escalation(tx, repository).await? else {
        return Ok(None);
    };

    if !escalation.transition(EscalationStatus::Resolved, Utc::now()) {
        return Ok(None);
    }
    tx.update(&mut escalation).await?;

    Ok(Some(format!(
        "This {} has been marked as resolved by @{}.",
        target.noun(),
        actor
    )))
}

async fn add_user(tx: &mut Transaction, handle: &str, name: &str) -> Result<String, OnCallError> {
    if user::find_by_handle(tx.conn(), handle).await?.is_some() {
        return Ok(format!("User @{} already exists.", handle));
    }

    let mut user = User::new(handle, name);
    tx.create(&mut user).await?;

    Ok(format!("User @{} has been added to the on-call system.", handle))
}

async fn add_rotation(
    tx: &mut Transaction,
    repository: &str,
    name: &str,
    actor: &str,
) -> Result<String, OnCallError> {
    if find_rotation_by_name(tx, repository, name).await?.is_some() {
        return Ok(format!("Rotation '{}' already exists.", name));
    }

    let mut rotation = Rotation::new(name, format!("Rotation created by @{}", actor), repository);
    tx.create(&mut rotation).await?;

    Ok(format!(
        "On-call rotation '{}' has been created for this repository.",
        name
    ))
}

async fn assign_user(
    tx: &mut Transaction,
    repository: &str,
    handle: &str,
    rotation_name: &str,
) -> Result<String, OnCallError> {
    let Some(user) = user::find_by_handle(tx.conn(), handle).await? else {
        return Ok(format!(
            "User @{} does not exist. Please add the user first.",
            handle
        ));
    };

    let Some(rotation) = find_rotation_by_name(tx, repository, rotation_name).await? else {
        return Ok(format!(
            "Rotation '{}' does not exist. Please create it first.",
            rotation_name
        ));
    };

    // Clears the previous current assignment of this rotation.
    let mut assignment = Assignment::new(&rotation.id, &user.id, true);
    tx.create(&mut assignment).await?;

    Ok(format!(
        "@{} has been assigned to the '{}' on-call rotation.",
        handle, rotation.name
    ))
}

async fn find_or_create_user(tx: &mut Transaction, handle: &str) -> Result<User, OnCallError> {
    if let Some(user) = user::find_by_handle(tx.conn(), handle).await? {
        return Ok(user);
    }

    let mut user = User::new(handle, handle);
    tx.create(&mut user).await?;
    info!(handle = %handle, "Registered user on first acknowledgment");
    Ok(user)
}

/// The repository's first rotation, creating "<repo> Default Rotation" if it
/// has none.
async fn find_or_create_default_rotation(
    tx: &mut Transaction,
    repository: &str,
) -> Result<Rotation, OnCallError> {
    let rotations = rotation::find_by_repository(tx.conn(), repository).await?;
    if let Some(first) = rotations.into_iter().next() {
        return Ok(first);
    }

    let mut rotation = Rotation::new(
        format!("{} Default Rotation", repository),
        "Default rotation created automatically",
        repository,
    );
    tx.create(&mut rotation).await?;
    Ok(rotation)
}

/// Case-insensitive rotation name lookup within a repository.
async fn find_rotation_by_name(
    tx: &mut Transaction,
    repository: &str,
    name: &str,
) -> Result<Option<Rotation>, OnCallError> {
    let wanted = name.to_lowercase();
    let rotations = rotation::find_by_repository(tx.conn(), repository).await?;
    Ok(rotations.into_iter().find(|r| r.name.to_lowercase() == wanted))
}
