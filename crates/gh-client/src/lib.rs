//! GitHub issue client with retry support
//!
//! This crate provides a trait-based client for the parts of the GitHub API
//! that heirloom needs: reading a repository's issues together with their
//! sub-issue hierarchy, and posting comments. Retry behavior is composed with
//! the base client as a decorator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               IssueClient trait                  │
//! │  - fetch_issues()                                │
//! │  - post_comment()                                │
//! └─────────────────────────────────────────────────┘
//!                        │
//!        ┌───────────────┴───────────────┐
//!        ▼                               ▼
//! ┌─────────────────┐         ┌─────────────────────┐
//! │ OctocrabClient  │         │ RetryingIssueClient │
//! │ (direct API)    │◄────────│ (decorator)         │
//! └─────────────────┘         └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_client::{IssueClient, OctocrabClient, RetryPolicy, RetryingIssueClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let octocrab = octocrab::Octocrab::builder()
//!     .personal_token("token".to_string())
//!     .build()?;
//!
//! let client = RetryingIssueClient::new(
//!     OctocrabClient::new(Arc::new(octocrab)),
//!     RetryPolicy::default(),
//! );
//!
//! let outcome = client.fetch_issues("owner", "repo").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connect;
pub mod error;
mod graphql;
pub mod octocrab_client;
pub mod retrying_client;
pub mod types;

/// Default GitHub host (public GitHub)
pub const DEFAULT_HOST: &str = "github.com";

pub use client::IssueClient;
pub use connect::{connect, TokenResolver};
pub use error::TransportError;
pub use octocrab_client::OctocrabClient;
pub use retrying_client::{RetryPolicy, RetryingIssueClient};
pub use types::{FetchOutcome, Issue, IssueState, UnresolvedIssue};

// Re-export octocrab so consumers don't need to depend on it directly
pub use octocrab;
