//! On-call module configuration.

use std::time::Duration;

/// Default time between sweeper ticks.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default age at which a pending escalation is promoted.
pub const DEFAULT_ESCALATION_THRESHOLD: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct OnCallConfig {
    /// Repositories (`owner/name`) the module acts on. Empty enables all.
    pub enabled_repositories: Vec<String>,
    pub sweep_interval: Duration,
    /// How long an escalation may stay pending before the sweeper escalates it.
    pub escalation_threshold: Duration,
}

impl OnCallConfig {
    pub fn is_repository_enabled(&self, repository: &str) -> bool {
        self.enabled_repositories.is_empty()
            || self.enabled_repositories.iter().any(|r| r == repository)
    }
}

impl Default for OnCallConfig {
    fn default() -> Self {
        Self {
            enabled_repositories: Vec::new(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
        }
    }
}
