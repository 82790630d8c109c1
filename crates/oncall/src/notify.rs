//! Best-effort comment posting.

use github_client::IssueCommenter;
use tracing::{debug, error};

use crate::target::Target;

/// Post a comment, logging instead of failing.
///
/// State changes are committed before this runs; a failed comment does not
/// undo them and is not retried.
pub(crate) async fn post(commenter: &dyn IssueCommenter, repository: &str, target: Target, body: &str) {
    match commenter.post_comment(repository, target.number(), body).await {
        Ok(()) => debug!(repo = %repository, %target, "Posted comment"),
        Err(e) => error!(repo = %repository, %target, "Failed to post comment: {}", e),
    }
}
