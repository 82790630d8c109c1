//! Error types for github-client.

use thiserror::Error;

/// Errors that can occur when talking to GitHub or reading its payloads.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Webhook payload was not valid JSON for its event type.
    #[error("invalid {event_type} payload: {source}")]
    Payload {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// Non-success response from the API.
    #[error("GitHub API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Token was rejected.
    #[error("GitHub credentials rejected (status {0})")]
    Unauthorized(u16),

    /// Repository key was not in `owner/name` form.
    #[error("invalid repository: {0}")]
    InvalidRepository(String),
}
