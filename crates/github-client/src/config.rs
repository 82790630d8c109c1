//! Configuration types for github-client.

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Connection settings for the GitHub REST API.
#[derive(Clone)]
pub struct GitHubConfig {
    /// Base URL of the REST API (e.g., "https://api.github.com").
    pub api_url: String,
    /// Token sent as a bearer credential.
    pub token: String,
}

impl GitHubConfig {
    /// Create a configuration against the public API.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_url(DEFAULT_API_URL, token)
    }

    /// Create a configuration for a GitHub Enterprise or test server.
    pub fn with_api_url(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        let api_url = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Get the comments endpoint for an issue or pull request.
    ///
    /// Pull requests share the issues comment endpoint.
    pub fn comments_url(&self, owner: &str, repo: &str, number: i64) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, owner, repo, number
        )
    }

    /// Get the endpoint used to check the token.
    pub fn rate_limit_url(&self) -> String {
        format!("{}/rate_limit", self.api_url)
    }
}

// The token stays out of logs.
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}
