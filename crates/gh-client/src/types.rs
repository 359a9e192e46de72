//! GitHub issue data transfer objects
//!
//! These types represent the issue data returned from the GitHub API.
//! They are intentionally free of API wire details so that the hierarchy
//! logic can be exercised with in-memory issues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// An issue from the GitHub API, with its place in the sub-issue hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number (e.g., 123), unique within the repository
    pub number: u64,

    /// Issue title
    pub title: String,

    /// Open or closed
    pub state: IssueState,

    /// Label names, as returned by GitHub
    pub labels: Vec<String>,

    /// Issue type name (e.g., "Epic"), if the repository uses issue types
    pub issue_type: Option<String>,

    /// Instant of the most recent activity on the issue
    pub last_activity: DateTime<Utc>,

    /// Numbers of parent issues in the same repository
    pub parents: Vec<u64>,

    /// Numbers of sub-issues in the same repository
    pub children: Vec<u64>,
}

impl Issue {
    /// Create an open issue with no labels, type or hierarchy links
    pub fn new(number: u64, title: impl Into<String>, last_activity: DateTime<Utc>) -> Self {
        Self {
            number,
            title: title.into(),
            state: IssueState::Open,
            labels: Vec::new(),
            issue_type: None,
            last_activity,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Whether the issue is still open
    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }
}

/// State of an issue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

/// Issues read for one repository
///
/// `unresolved` lists linked issues that exist but could not be read, so
/// callers know the hierarchy around them may be incomplete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub issues: Vec<Issue>,
    pub unresolved: Vec<UnresolvedIssue>,
}

impl FetchOutcome {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            issues,
            unresolved: Vec::new(),
        }
    }
}

/// A linked issue whose lookup failed
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedIssue {
    pub number: u64,
    pub error: TransportError,
}
