//! Octocrab-based GitHub issue client
//!
//! Direct implementation of the `IssueClient` trait using the octocrab library.
//! This client makes real API calls without any retry behavior.

use crate::client::IssueClient;
use crate::error::TransportError;
use crate::graphql::{
    alias, convert_issue_node, issues_by_number_query, open_issues_query, GraphQlResponse,
    IssueLookup, IssuesPage, RepositoryData,
};
use crate::types::{FetchOutcome, Issue, UnresolvedIssue};
use async_trait::async_trait;
use log::{debug, warn};
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::{BTreeSet, HashSet};
use std::future::Future;
use std::sync::Arc;

/// Issue numbers resolved per aliased lookup query
const LOOKUP_BATCH: usize = 25;

/// Rounds of referenced-issue resolution before giving up on closure
const MAX_RESOLVE_ROUNDS: usize = 5;

/// Direct GitHub API client using octocrab
///
/// This is the base implementation that makes actual API calls.
/// It can be wrapped by `RetryingIssueClient` to add retry behavior.
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
}

impl OctocrabClient {
    /// Create a new client with the given octocrab instance
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }

    async fn query<T: DeserializeOwned + Send>(
        &self,
        query: String,
        variables: serde_json::Value,
    ) -> Result<T, TransportError> {
        let payload = json!({ "query": query, "variables": variables });
        let response: GraphQlResponse<T> = self.octocrab.graphql(&payload).await?;
        response.into_data()
    }

    /// Page through every open issue of the repository
    async fn fetch_open_issues(&self, owner: &str, repo: &str) -> Result<Vec<Issue>, TransportError> {
        let name_with_owner = format!("{}/{}", owner, repo);
        let query = open_issues_query();
        let mut issues = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data: RepositoryData<IssuesPage> = self
                .query(
                    query.clone(),
                    json!({ "owner": owner, "name": repo, "cursor": cursor }),
                )
                .await?;

            let page = data
                .repository
                .ok_or_else(|| {
                    TransportError::GraphQl(vec![format!(
                        "repository {} not found",
                        name_with_owner
                    )])
                })?
                .issues;

            issues.extend(
                page.nodes
                    .into_iter()
                    .flatten()
                    .map(|node| convert_issue_node(node, &name_with_owner)),
            );

            match page.page_info {
                Some(info) if info.has_next_page && info.end_cursor.is_some() => {
                    cursor = info.end_cursor;
                }
                _ => break,
            }
        }

        debug!("Fetched {} open issues for {}", issues.len(), name_with_owner);
        Ok(issues)
    }

    /// Look up specific issues by number
    ///
    /// Failures are per batch: every number in a batch that cannot be read
    /// is returned as unresolved with the batch's error.
    async fn fetch_issues_by_number(
        &self,
        owner: &str,
        repo: &str,
        numbers: &[u64],
    ) -> (Vec<Issue>, Vec<UnresolvedIssue>) {
        let name_with_owner = format!("{}/{}", owner, repo);
        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();

        for batch in numbers.chunks(LOOKUP_BATCH) {
            let result: Result<RepositoryData<IssueLookup>, TransportError> = self
                .query(
                    issues_by_number_query(batch),
                    json!({ "owner": owner, "name": repo }),
                )
                .await;

            let lookup = result.and_then(|data| {
                data.repository.ok_or_else(|| {
                    TransportError::Decode(format!("repository {} not found", name_with_owner))
                })
            });
            let mut lookup = match lookup {
                Ok(lookup) => lookup,
                Err(e) => {
                    warn!("Failed to resolve issues {:?} in {}: {}", batch, name_with_owner, e);
                    unresolved.extend(batch.iter().map(|&number| UnresolvedIssue {
                        number,
                        error: e.clone(),
                    }));
                    continue;
                }
            };

            for number in batch {
                match lookup.remove(&alias(*number)).flatten() {
                    Some(node) => resolved.push(convert_issue_node(node, &name_with_owner)),
                    None => debug!("#{} in {} is not a readable issue", number, name_with_owner),
                }
            }
        }

        (resolved, unresolved)
    }
}

/// Add the issues linked from `issues` that are not in it yet
///
/// `lookup` resolves a sorted list of numbers. Newly resolved issues can
/// link further issues, so lookups repeat for at most
/// [`MAX_RESOLVE_ROUNDS`] rounds. The result is sorted by number.
async fn resolve_linked_issues<F, Fut>(issues: Vec<Issue>, mut lookup: F) -> FetchOutcome
where
    F: FnMut(Vec<u64>) -> Fut,
    Fut: Future<Output = (Vec<Issue>, Vec<UnresolvedIssue>)>,
{
    let mut outcome = FetchOutcome::new(issues);
    let mut known: HashSet<u64> = outcome.issues.iter().map(|i| i.number).collect();
    let mut rounds = 0;

    loop {
        let missing: BTreeSet<u64> = outcome
            .issues
            .iter()
            .flat_map(|i| i.parents.iter().chain(i.children.iter()))
            .filter(|n| !known.contains(*n))
            .copied()
            .collect();

        if missing.is_empty() {
            break;
        }
        if rounds == MAX_RESOLVE_ROUNDS {
            warn!(
                "Stopped resolving linked issues after {} rounds, {} still missing: {:?}",
                MAX_RESOLVE_ROUNDS,
                missing.len(),
                missing
            );
            break;
        }
        rounds += 1;

        known.extend(missing.iter().copied());
        let requested = missing.len();
        let (resolved, failed) = lookup(missing.into_iter().collect()).await;
        debug!(
            "Resolved {} of {} linked issues outside the open set",
            resolved.len(),
            requested
        );

        outcome.unresolved.extend(failed);
        if resolved.is_empty() {
            break;
        }
        outcome.issues.extend(resolved);
    }

    outcome.issues.sort_by_key(|i| i.number);
    outcome.unresolved.sort_by_key(|u| u.number);
    outcome
}

#[async_trait]
impl IssueClient for OctocrabClient {
    async fn fetch_issues(&self, owner: &str, repo: &str) -> Result<FetchOutcome, TransportError> {
        debug!("Fetching issues for {}/{}", owner, repo);

        let open = self.fetch_open_issues(owner, repo).await?;

        // Pull in closed issues that open ones link to, so the hierarchy
        // is complete on both ends of each edge.
        let outcome = resolve_linked_issues(open, |missing: Vec<u64>| async move {
            self.fetch_issues_by_number(owner, repo, &missing).await
        })
        .await;

        debug!(
            "Fetched {} issues for {}/{} ({} unresolved)",
            outcome.issues.len(),
            owner,
            repo,
            outcome.unresolved.len()
        );
        Ok(outcome)
    }

    async fn post_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<(), TransportError> {
        debug!("Posting comment on {}/{}#{}", owner, repo, issue_number);

        self.octocrab
            .issues(owner, repo)
            .create_comment(issue_number, body)
            .await?;

        Ok(())
    }
}
