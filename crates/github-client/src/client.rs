//! GitHub REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GitHubConfig;
use crate::error::GitHubError;

/// Posts comments on issues and pull requests.
///
/// This is the only outbound surface the on-call engine depends on, so tests
/// can substitute an in-memory implementation.
#[async_trait]
pub trait IssueCommenter: Send + Sync {
    /// Post `body` as a comment on issue or pull request `number` of
    /// `repository` (`owner/name`).
    async fn post_comment(&self, repository: &str, number: i64, body: &str)
        -> Result<(), GitHubError>;

    /// Check that the credentials are accepted.
    ///
    /// Default implementation does nothing.
    async fn verify(&self) -> Result<(), GitHubError> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

/// Client for the GitHub REST API.
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    config: GitHubConfig,
}

impl GitHubClient {
    /// Build a client. No request is made until the first call.
    pub fn new(config: GitHubConfig) -> Result<Self, GitHubError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("pager/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn check(response: Response) -> Result<Response, GitHubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GitHubError::Unauthorized(status.as_u16()));
        }

        let message = response.text().await.unwrap_or_default();
        Err(GitHubError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Split `owner/name` into its parts.
fn split_repository(repository: &str) -> Result<(&str, &str), GitHubError> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(GitHubError::InvalidRepository(repository.to_string())),
    }
}

#[async_trait]
impl IssueCommenter for GitHubClient {
    async fn post_comment(
        &self,
        repository: &str,
        number: i64,
        body: &str,
    ) -> Result<(), GitHubError> {
        let (owner, name) = split_repository(repository)?;
        let url = self.config.comments_url(owner, name, number);
        debug!(repo = %repository, number, "Posting comment");

        let response = self
            .authorized(self.http.post(&url))
            .json(&CommentRequest { body })
            .send()
            .await?;
        Self::check(response).await?;

        Ok(())
    }

    async fn verify(&self) -> Result<(), GitHubError> {
        let response = self
            .authorized(self.http.get(self.config.rate_limit_url()))
            .send()
            .await?;
        Self::check(response).await?;

        info!("GitHub credentials verified against {}", self.config.api_url);
        Ok(())
    }
}
