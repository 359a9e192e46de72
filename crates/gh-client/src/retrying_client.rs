//! Retrying issue client (decorator pattern)
//!
//! Wraps any `IssueClient` implementation to add a basic retry contract.
//! Reads are retried on every retryable error; writes only when GitHub
//! rejected the request before acting on it, so a comment is never posted
//! twice.

use crate::client::IssueClient;
use crate::error::TransportError;
use crate::types::FetchOutcome;
use async_trait::async_trait;
use log::{debug, warn};
use std::future::Future;
use std::time::Duration;

/// How often and how patiently to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (at least 1)
    pub max_attempts: u32,
    /// Delay before the second attempt; grows linearly per attempt
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before attempt number `attempt + 1`
    fn delay(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

/// Issue client with retry behavior using the decorator pattern
///
/// # Example
///
/// ```rust,ignore
/// use gh_client::{OctocrabClient, RetryPolicy, RetryingIssueClient};
///
/// let octocrab = Arc::new(octocrab::Octocrab::builder().build().unwrap());
/// let client = RetryingIssueClient::new(OctocrabClient::new(octocrab), RetryPolicy::default());
/// ```
#[derive(Debug, Clone)]
pub struct RetryingIssueClient<C: IssueClient> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: IssueClient> RetryingIssueClient<C> {
    /// Create a new retrying client
    ///
    /// # Arguments
    ///
    /// * `inner` - The inner client to delegate API calls to
    /// * `policy` - Retry attempts and backoff
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Get the retry policy
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Get a reference to the inner client
    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn with_retry<T, F, Fut>(
        &self,
        operation: &str,
        should_retry: fn(&TransportError) -> bool,
        mut call: F,
    ) -> Result<T, TransportError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, TransportError>> + Send,
        T: Send,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts && should_retry(&e) => {
                    let delay = self.policy.delay(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        operation, attempt, max_attempts, e, delay
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => {
                    debug!("{} failed after {} attempt(s): {}", operation, attempt, e);
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl<C: IssueClient> IssueClient for RetryingIssueClient<C> {
    async fn fetch_issues(&self, owner: &str, repo: &str) -> Result<FetchOutcome, TransportError> {
        self.with_retry("fetch issues", TransportError::is_retryable, || {
            self.inner.fetch_issues(owner, repo)
        })
        .await
    }

    async fn post_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<(), TransportError> {
        self.with_retry(
            "post comment",
            TransportError::is_rejected_before_write,
            || self.inner.post_comment(owner, repo, issue_number, body),
        )
        .await
    }
}
