//! Parent issue protection for GitHub sub-issue hierarchies
//!
//! Stale bots close issues that have seen no activity for a while. Parent
//! issues (epics, initiatives) are often quiet while the work happens in
//! their sub-issues. This crate finds such parents and plans one refresh
//! comment for each of them per run.
//!
//! # Architecture
//!
//! ```text
//! IssueClient ──fetch──► HierarchyGraph ──► select_parents ──► plan ──► post
//!                        (index, cycle        (filters or       (one action
//!                         check)               all ancestors)    per parent)
//! ```
//!
//! Everything between fetching and posting is synchronous and pure; the
//! run's `now` is captured once and threaded through [`ActivityEvaluator`].

pub mod activity;
pub mod error;
pub mod hierarchy;
pub mod orchestrator;
pub mod planner;
pub mod report;
pub mod selector;

#[cfg(test)]
mod test_support;

pub use activity::{is_recently_active, ActivityEvaluator};
pub use error::{RunError, StructuralError};
pub use hierarchy::HierarchyGraph;
pub use orchestrator::{prepare, run, RunOptions};
pub use planner::{plan, render_message, RefreshAction};
pub use report::{ActionFailure, FetchFailure, PlannedAction, RunReport};
pub use selector::select_parents;
