//! Periodic promotion of stale pending escalations.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use database::{Database, Escalation, EscalationStatus};
use github_client::IssueCommenter;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_SWEEP_INTERVAL;
use crate::error::OnCallError;
use crate::notify;
use crate::target::Target;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Pending escalations looked at.
    pub examined: usize,
    pub escalated: usize,
    /// Not old enough yet, or no longer pending when re-read.
    pub skipped: usize,
    /// Write failed; still pending and retried next tick.
    pub failed: usize,
}

/// Escalates pending escalations older than a threshold.
pub struct Sweeper {
    db: Database,
    commenter: Arc<dyn IssueCommenter>,
    threshold: chrono::Duration,
}

impl Sweeper {
    pub fn new(db: Database, commenter: Arc<dyn IssueCommenter>, threshold: Duration) -> Self {
        Self {
            db,
            commenter,
            threshold: chrono::Duration::from_std(threshold).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Sweep once as of `now`.
    ///
    /// An escalation is promoted once `created_at + threshold` is no longer
    /// in the future. A failure on one entry is logged and the sweep moves on.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<SweepReport, OnCallError> {
        let pending = self
            .db
            .escalations()
            .find_by_status(EscalationStatus::Pending)
            .await?;

        let mut report = SweepReport {
            examined: pending.len(),
            ..Default::default()
        };

        for candidate in pending {
            let due = candidate
                .created_at
                .checked_add_signed(self.threshold)
                .is_some_and(|deadline| deadline <= now);
            if !due {
                report.skipped += 1;
                continue;
            }

            match self.promote(&candidate.id, now).await {
                Ok(Some(escalation)) => {
                    report.escalated += 1;
                    self.announce(&escalation).await;
                }
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(escalation = %candidate.id, "Failed to auto-escalate: {}", e);
                }
            }
        }

        if report.escalated > 0 || report.failed > 0 {
            info!(
                escalated = report.escalated,
                failed = report.failed,
                examined = report.examined,
                "Escalation sweep finished"
            );
        } else {
            debug!(examined = report.examined, "Escalation sweep found nothing due");
        }

        Ok(report)
    }

    /// Re-read and escalate inside one transaction, so an acknowledgment that
    /// landed since the scan is not overwritten.
    async fn promote(&self, id: &str, now: DateTime<Utc>) -> Result<Option<Escalation>, OnCallError> {
        let mut tx = self.db.begin().await?;

        let Some(mut escalation) = tx.find_by_id::<Escalation>(id).await? else {
            return Ok(None);
        };
        if escalation.status != EscalationStatus::Pending
            || !escalation.transition(EscalationStatus::Escalated, now)
        {
            return Ok(None);
        }

        tx.update(&mut escalation).await?;
        tx.commit().await?;

        Ok(Some(escalation))
    }

    async fn announce(&self, escalation: &Escalation) {
        let Some(target) = Target::of(escalation) else {
            warn!(escalation = %escalation.id, "Escalated without an issue or pull request to notify");
            return;
        };

        let body = format!(
            "This {} has been automatically escalated due to lack of acknowledgment.",
            target.noun()
        );
        notify::post(self.commenter.as_ref(), &escalation.repository, target, &body).await;
    }

    /// Run [`Sweeper::sweep_once`] every `period` until stopped.
    ///
    /// The first sweep happens one period after spawning. A zero period
    /// falls back to [`DEFAULT_SWEEP_INTERVAL`].
    pub fn spawn(self: Arc<Self>, period: Duration) -> SweeperHandle {
        let period = if period.is_zero() {
            warn!(
                fallback = ?DEFAULT_SWEEP_INTERVAL,
                "Zero sweep interval, using the default"
            );
            DEFAULT_SWEEP_INTERVAL
        } else {
            period
        };
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            info!(period = ?period, threshold = %self.threshold, "Starting escalation sweeper");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // Runs to completion; stop is only observed between ticks.
                        if let Err(e) = self.sweep_once(Utc::now()).await {
                            error!("Escalation sweep failed: {}", e);
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            info!("Escalation sweeper stopped");
        });

        SweeperHandle {
            stop: stop_tx,
            task,
        }
    }
}

/// Handle to a running sweeper.
pub struct SweeperHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the sweeper and wait for its loop to exit.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            error!("Escalation sweeper task failed: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
