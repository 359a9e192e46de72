//! GraphQL queries and response shapes for the issue hierarchy
//!
//! Sub-issue links and issue types are only exposed through the GraphQL API,
//! so the whole issue set is read from there.

use crate::error::TransportError;
use crate::types::{Issue, IssueState};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;

/// Issues requested per page
pub const PAGE_SIZE: u32 = 50;

const ISSUE_FIELDS: &str = r#"
fragment IssueFields on Issue {
  number
  title
  state
  updatedAt
  issueType { name }
  labels(first: 50) { nodes { name } }
  parent { number repository { nameWithOwner } }
  subIssues(first: 100) { nodes { number repository { nameWithOwner } } }
}
"#;

/// Query for one page of open issues
pub fn open_issues_query() -> String {
    format!(
        r#"query($owner: String!, $name: String!, $cursor: String) {{
  repository(owner: $owner, name: $name) {{
    issues(first: {PAGE_SIZE}, after: $cursor, states: OPEN) {{
      pageInfo {{ hasNextPage endCursor }}
      nodes {{ ...IssueFields }}
    }}
  }}
}}
{ISSUE_FIELDS}"#
    )
}

/// Query resolving specific issue numbers, one alias per number
pub fn issues_by_number_query(numbers: &[u64]) -> String {
    let fields: String = numbers
        .iter()
        .map(|n| format!("    {}: issue(number: {n}) {{ ...IssueFields }}\n", alias(*n)))
        .collect();

    format!(
        r#"query($owner: String!, $name: String!) {{
  repository(owner: $owner, name: $name) {{
{fields}  }}
}}
{ISSUE_FIELDS}"#
    )
}

/// Alias used for an issue number in [`issues_by_number_query`]
pub fn alias(number: u64) -> String {
    format!("i{number}")
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    /// Take the data, failing only when GitHub returned none at all
    ///
    /// Partial errors alongside data are logged and otherwise tolerated.
    pub fn into_data(self) -> Result<T, TransportError> {
        let messages: Vec<String> = self.errors.into_iter().map(|e| e.message).collect();
        match self.data {
            Some(data) => {
                for message in &messages {
                    warn!("GraphQL reported a partial error: {}", message);
                }
                Ok(data)
            }
            None if messages.is_empty() => Err(TransportError::Decode(
                "GraphQL response had neither data nor errors".to_string(),
            )),
            None => Err(TransportError::GraphQl(messages)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RepositoryData<T> {
    pub repository: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct IssuesPage {
    pub issues: Connection<IssueNode>,
}

/// Aliased `issue(number:)` lookups; an alias maps to null when GitHub has
/// no issue under that number (e.g. it is a pull request)
pub type IssueLookup = HashMap<String, Option<IssueNode>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default)]
    pub page_info: Option<PageInfo>,
    #[serde(default = "Vec::new")]
    pub nodes: Vec<Option<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueNode {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub updated_at: DateTime<Utc>,
    pub issue_type: Option<NamedNode>,
    pub labels: Option<Connection<NamedNode>>,
    pub parent: Option<LinkedIssue>,
    pub sub_issues: Option<Connection<LinkedIssue>>,
}

#[derive(Debug, Deserialize)]
pub struct NamedNode {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LinkedIssue {
    pub number: u64,
    pub repository: RepositoryName,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryName {
    pub name_with_owner: String,
}

/// Convert a GraphQL issue node to our Issue type
///
/// Links to issues in other repositories are dropped here: issue numbers
/// are only unique within one repository.
pub fn convert_issue_node(node: IssueNode, name_with_owner: &str) -> Issue {
    let in_scope = |linked: &LinkedIssue| {
        let same_repo = linked
            .repository
            .name_with_owner
            .eq_ignore_ascii_case(name_with_owner);
        if !same_repo {
            debug!(
                "Ignoring link from #{} to {}#{} (other repository)",
                node.number, linked.repository.name_with_owner, linked.number
            );
        }
        same_repo
    };

    let parents = node
        .parent
        .iter()
        .filter(|p| in_scope(*p))
        .map(|p| p.number)
        .collect();

    let children = node
        .sub_issues
        .iter()
        .flat_map(|c| c.nodes.iter().flatten())
        .filter(|c| in_scope(*c))
        .map(|c| c.number)
        .collect();

    let labels = node
        .labels
        .into_iter()
        .flat_map(|c| c.nodes.into_iter().flatten())
        .map(|l| l.name)
        .collect();

    Issue {
        number: node.number,
        title: node.title,
        state: convert_state(&node.state),
        labels,
        issue_type: node.issue_type.map(|t| t.name),
        last_activity: node.updated_at,
        parents,
        children,
    }
}

/// Convert the GraphQL IssueState enum string to our enum
fn convert_state(state: &str) -> IssueState {
    match state.to_uppercase().as_str() {
        "CLOSED" => IssueState::Closed,
        _ => IssueState::Open,
    }
}
