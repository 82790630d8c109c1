//! The on-call feature module.

use std::sync::Arc;

use async_trait::async_trait;
use database::Database;
use github_client::{IssueCommenter, WebhookEvent};
use module_core::{Module, ModuleError};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::command::Command;
use crate::config::OnCallConfig;
use crate::engine::OnCallEngine;
use crate::sweeper::{Sweeper, SweeperHandle};
use crate::target::Target;

/// Registry name of the module.
pub const MODULE_NAME: &str = "oncall";

/// Reacts to issue and pull request comments and owns the escalation sweeper.
pub struct OnCallModule {
    config: OnCallConfig,
    engine: OnCallEngine,
    sweeper: Arc<Sweeper>,
    running: Mutex<Option<SweeperHandle>>,
}

impl OnCallModule {
    pub fn new(config: OnCallConfig, db: Database, commenter: Arc<dyn IssueCommenter>) -> Self {
        let sweeper = Sweeper::new(db.clone(), commenter.clone(), config.escalation_threshold);
        Self {
            config,
            engine: OnCallEngine::new(db, commenter),
            sweeper: Arc::new(sweeper),
            running: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &OnCallEngine {
        &self.engine
    }

    pub fn sweeper(&self) -> &Arc<Sweeper> {
        &self.sweeper
    }

    /// Whether the background sweeper is currently running.
    pub async fn is_sweeping(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn run_comment(
        &self,
        repository: &str,
        target: Target,
        actor: &str,
        body: &str,
        escalation_only: bool,
    ) -> Result<(), ModuleError> {
        let Some(command) = Command::parse(body) else {
            return Ok(());
        };
        if escalation_only && !command.targets_escalation() {
            debug!(repo = %repository, %target, ?command, "Command not supported here");
            return Ok(());
        }

        self.engine.execute(repository, target, actor, &command).await?;
        Ok(())
    }
}

#[async_trait]
impl Module for OnCallModule {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    async fn handle_event(&self, event: &WebhookEvent, _raw: &[u8]) -> Result<(), ModuleError> {
        if let Some(repository) = event.repository() {
            if !self.config.is_repository_enabled(repository) {
                debug!(repo = %repository, "Repository not enabled for on-call");
                return Ok(());
            }
        }

        match event {
            WebhookEvent::Issues(e) if e.action == "opened" => {
                info!(
                    repo = %e.repository.full_name,
                    number = e.issue.number,
                    title = %e.issue.title,
                    "New issue opened"
                );
            }
            WebhookEvent::PullRequest(e) if e.action == "opened" => {
                info!(
                    repo = %e.repository.full_name,
                    number = e.pull_request.number,
                    title = %e.pull_request.title,
                    "New pull request opened"
                );
            }
            WebhookEvent::IssueComment(e) if e.action == "created" => {
                self.run_comment(
                    &e.repository.full_name,
                    Target::Issue(e.issue.number),
                    &e.comment.user.login,
                    &e.comment.body,
                    false,
                )
                .await?;
            }
            WebhookEvent::PullRequestReviewComment(e) if e.action == "created" => {
                self.run_comment(
                    &e.repository.full_name,
                    Target::PullRequest(e.pull_request.number),
                    &e.comment.user.login,
                    &e.comment.body,
                    true,
                )
                .await?;
            }
            other => debug!(event = %other.event_type(), "Ignoring event"),
        }

        Ok(())
    }

    /// Check the schema and start the sweeper.
    async fn initialize(&self) -> Result<(), ModuleError> {
        self.engine
            .database()
            .ensure_schema()
            .await
            .map_err(|e| ModuleError::Initialize {
                module: MODULE_NAME.to_string(),
                message: e.to_string(),
            })?;

        let mut running = self.running.lock().await;
        if running.is_none() {
            *running = Some(self.sweeper.clone().spawn(self.config.sweep_interval));
        }

        info!(
            repositories = self.config.enabled_repositories.len(),
            "On-call module initialized"
        );
        Ok(())
    }

    /// Stop the sweeper. Safe to call more than once.
    async fn shutdown(&self) -> Result<(), ModuleError> {
        info!("Shutting down on-call module");
        if let Some(handle) = self.running.lock().await.take() {
            handle.stop().await;
        }
        Ok(())
    }
}
