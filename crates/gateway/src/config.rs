//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use github_client::config::DEFAULT_API_URL;
use github_client::GitHubConfig;
use oncall::OnCallConfig;

/// Pager process configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Shared secret for `X-Hub-Signature-256`.
    pub webhook_secret: String,
    /// Token used to post comments.
    pub github_token: String,
    /// GitHub REST API base URL.
    pub github_api_url: String,
    /// Repositories the on-call module acts on. Empty enables all.
    pub enabled_repositories: Vec<String>,
    pub sweep_interval: Duration,
    pub escalation_threshold: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `PAGER_ADDR` | Server bind address | `0.0.0.0:8080` |
    /// | `PAGER_DATABASE_URL` | SQLite database URL | `sqlite:pager.db?mode=rwc` |
    /// | `PAGER_WEBHOOK_SECRET` | Webhook HMAC secret | (required) |
    /// | `GITHUB_TOKEN` | API token for comments | (required) |
    /// | `GITHUB_API_URL` | API base URL | `https://api.github.com` |
    /// | `ONCALL_ENABLED_REPOSITORIES` | Comma-separated `owner/name` list | (all) |
    /// | `ONCALL_SWEEP_INTERVAL_SECS` | Sweeper period | `300` |
    /// | `ONCALL_ESCALATION_THRESHOLD_SECS` | Pending age before escalation | `86400` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup("PAGER_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            lookup("PAGER_DATABASE_URL").unwrap_or_else(|| "sqlite:pager.db?mode=rwc".to_string());

        let webhook_secret = lookup("PAGER_WEBHOOK_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingWebhookSecret)?;

        let github_token = lookup("GITHUB_TOKEN")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingGitHubToken)?;

        let github_api_url = lookup("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let enabled_repositories = lookup("ONCALL_ENABLED_REPOSITORIES")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let sweep_interval = seconds(&lookup, "ONCALL_SWEEP_INTERVAL_SECS", 300, 1)?;
        let escalation_threshold =
            seconds(&lookup, "ONCALL_ESCALATION_THRESHOLD_SECS", 86_400, 0)?;

        Ok(Self {
            addr,
            database_url,
            webhook_secret,
            github_token,
            github_api_url,
            enabled_repositories,
            sweep_interval,
            escalation_threshold,
        })
    }

    pub fn github(&self) -> GitHubConfig {
        GitHubConfig::with_api_url(&self.github_api_url, &self.github_token)
    }

    pub fn oncall(&self) -> OnCallConfig {
        OnCallConfig {
            enabled_repositories: self.enabled_repositories.clone(),
            sweep_interval: self.sweep_interval,
            escalation_threshold: self.escalation_threshold,
        }
    }
}

/// Parse a whole number of seconds, at least `min`.
fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
    min: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default));
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs >= min => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidNumber(key)),
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("database_url", &self.database_url)
            .field("github_api_url", &self.github_api_url)
            .field("enabled_repositories", &self.enabled_repositories)
            .field("sweep_interval", &self.sweep_interval)
            .field("escalation_threshold", &self.escalation_threshold)
            .finish_non_exhaustive()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PAGER_ADDR format")]
    InvalidAddr,

    #[error("PAGER_WEBHOOK_SECRET environment variable is required")]
    MissingWebhookSecret,

    #[error("GITHUB_TOKEN environment variable is required")]
    MissingGitHubToken,

    #[error("{0} must be a positive whole number of seconds")]
    InvalidNumber(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("PAGER_WEBHOOK_SECRET", "s3cret"), ("GITHUB_TOKEN", "ghp_x")];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.database_url, "sqlite:pager.db?mode=rwc");
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert!(config.enabled_repositories.is_empty());
        assert_eq!(config.sweep_interval, Duration::from_secs(300));
        assert_eq!(config.escalation_threshold, Duration::from_secs(86_400));
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PAGER_ADDR", "127.0.0.1:9000"));
        vars.push(("ONCALL_ENABLED_REPOSITORIES", "acme/repo, acme/other,,"));
        vars.push(("ONCALL_SWEEP_INTERVAL_SECS", "60"));
        vars.push(("ONCALL_ESCALATION_THRESHOLD_SECS", "0"));
        let config = load(&vars).unwrap();

        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.enabled_repositories, vec!["acme/repo", "acme/other"]);
        let oncall = config.oncall();
        assert_eq!(oncall.sweep_interval, Duration::from_secs(60));
        assert_eq!(oncall.escalation_threshold, Duration::ZERO);
    }

    #[test]
    fn test_required_and_invalid() {
        assert!(matches!(
            load(&[("GITHUB_TOKEN", "t")]),
            Err(ConfigError::MissingWebhookSecret)
        ));
        assert!(matches!(
            load(&[("PAGER_WEBHOOK_SECRET", "s")]),
            Err(ConfigError::MissingGitHubToken)
        ));

        let mut vars = REQUIRED.to_vec();
        vars.push(("ONCALL_SWEEP_INTERVAL_SECS", "0"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidNumber(_))));

        let mut vars = REQUIRED.to_vec();
        vars.push(("PAGER_ADDR", "not an address"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidAddr)));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let printed = format!("{:?}", load(&REQUIRED).unwrap());
        assert!(!printed.contains("s3cret"));
        assert!(!printed.contains("ghp_x"));
    }
}
