//! GitHub integration for Pager.
//!
//! This crate provides:
//!
//! - Typed webhook payloads ([`WebhookEvent`]) parsed from the event-type
//!   header and raw body
//! - A REST client ([`GitHubClient`]) that posts issue and pull request
//!   comments and verifies its token
//! - The [`IssueCommenter`] trait, the only surface the on-call engine sees
//!
//! # Example
//!
//! ```no_run
//! use github_client::{GitHubClient, GitHubConfig, IssueCommenter};
//!
//! # async fn example() -> Result<(), github_client::GitHubError> {
//! let config = GitHubConfig::new("ghp_example");
//! let client = GitHubClient::new(config)?;
//!
//! client.verify().await?;
//! client.post_comment("acme/repo", 42, "@alice has acknowledged this issue.").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{GitHubClient, IssueCommenter};
pub use config::GitHubConfig;
pub use error::GitHubError;
pub use types::*;
