//! Issue client trait definition
//!
//! This module defines the `IssueClient` trait that every client
//! implementation must satisfy. The hierarchy logic in `heirloom-core`
//! only ever talks to GitHub through this trait.

use crate::error::TransportError;
use crate::types::FetchOutcome;
use async_trait::async_trait;

/// GitHub issue client trait
///
/// Implementations can be direct (hitting the API) or decorated with
/// retry logic. Callers treat both operations as safe to repeat; neither
/// method retries on its own unless it is a decorator built for that.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across
/// async tasks and threads.
///
/// # Example
///
/// ```rust,ignore
/// use gh_client::{Issue, IssueClient, TransportError};
///
/// async fn open_issues(client: &dyn IssueClient) -> Result<Vec<Issue>, TransportError> {
///     Ok(client.fetch_issues("rust-lang", "rust").await?.issues)
/// }
/// ```
#[async_trait]
pub trait IssueClient: Send + Sync {
    /// Fetch the candidate issue set for a repository
    ///
    /// The result contains every open issue plus any closed issues the
    /// client could resolve that are referenced as a parent or sub-issue of
    /// a fetched issue. Links to issues outside the repository are never
    /// included.
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner (user or organization)
    /// * `repo` - Repository name
    ///
    /// # Returns
    ///
    /// The issues with labels, type, state, last activity and hierarchy
    /// links, plus the linked issues whose lookup failed. An error means
    /// the issue list could not be read at all.
    async fn fetch_issues(&self, owner: &str, repo: &str) -> Result<FetchOutcome, TransportError>;

    /// Post a comment on an issue
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    /// * `issue_number` - Issue number
    /// * `body` - Comment body text
    async fn post_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<(), TransportError>;
}
