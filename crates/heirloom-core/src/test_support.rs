//! In-memory issue client for tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use gh_client::{FetchOutcome, Issue, IssueClient, TransportError, UnresolvedIssue};
use tokio::sync::watch;

/// Serves a fixed issue list and records posted comments
#[derive(Default)]
pub struct FakeIssueClient {
    issues: Vec<Issue>,
    unresolved: Vec<UnresolvedIssue>,
    fetch_error: Option<TransportError>,
    stall_fetch: bool,
    shutdown_on_post: Option<watch::Sender<bool>>,
    post_errors: HashMap<u64, TransportError>,
    fetch_calls: Mutex<usize>,
    posts: Mutex<Vec<(u64, String)>>,
}

impl FakeIssueClient {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            issues,
            ..Default::default()
        }
    }

    pub fn failing_fetch(error: TransportError) -> Self {
        Self {
            fetch_error: Some(error),
            ..Default::default()
        }
    }

    /// Report `number` as a linked issue that could not be fetched
    pub fn unresolved(mut self, number: u64, error: TransportError) -> Self {
        self.unresolved.push(UnresolvedIssue { number, error });
        self
    }

    /// A client whose fetch never completes
    pub fn stalled() -> Self {
        Self {
            stall_fetch: true,
            ..Default::default()
        }
    }

    /// Request shutdown as soon as the first comment is posted
    pub fn shutdown_after_post(mut self, shutdown: watch::Sender<bool>) -> Self {
        self.shutdown_on_post = Some(shutdown);
        self
    }

    /// Make posts to `issue` fail with `error`
    pub fn fail_post(mut self, issue: u64, error: TransportError) -> Self {
        self.post_errors.insert(issue, error);
        self
    }

    pub fn fetch_calls(&self) -> usize {
        *self.fetch_calls.lock().unwrap()
    }

    /// Every attempted post, in call order, failed ones included
    pub fn posts(&self) -> Vec<(u64, String)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueClient for FakeIssueClient {
    async fn fetch_issues(&self, _owner: &str, _repo: &str) -> Result<FetchOutcome, TransportError> {
        *self.fetch_calls.lock().unwrap() += 1;
        if self.stall_fetch {
            std::future::pending::<()>().await;
        }
        match &self.fetch_error {
            Some(err) => Err(err.clone()),
            None => Ok(FetchOutcome {
                issues: self.issues.clone(),
                unresolved: self.unresolved.clone(),
            }),
        }
    }

    async fn post_comment(
        &self,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<(), TransportError> {
        self.posts
            .lock()
            .unwrap()
            .push((issue_number, body.to_string()));
        if let Some(shutdown) = &self.shutdown_on_post {
            let _ = shutdown.send(true);
        }
        match self.post_errors.get(&issue_number) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
