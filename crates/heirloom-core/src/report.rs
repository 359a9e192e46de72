use std::fmt;

use serde::Serialize;

use crate::planner::RefreshAction;

/// A refresh comment that could not be posted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionFailure {
    pub issue: u64,
    pub cause: String,
}

/// A linked issue that could not be fetched
///
/// Its links are missing from the hierarchy, so parents above it may have
/// gone unprotected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub issue: u64,
    pub cause: String,
}

/// Target and trigger of a planned refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedAction {
    pub target: u64,
    pub trigger: u64,
}

/// Outcome of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub parents_evaluated: usize,
    pub actions_planned: usize,
    pub actions_succeeded: usize,
    pub actions_failed: usize,
    /// Planned but never posted (dry run or cancellation)
    pub actions_skipped: usize,
    pub cancelled: bool,
    pub failures: Vec<ActionFailure>,
    pub fetch_failures: Vec<FetchFailure>,
    pub actions: Vec<PlannedAction>,
}

impl RunReport {
    pub fn new(parents_evaluated: usize, actions: &[RefreshAction]) -> Self {
        Self {
            parents_evaluated,
            actions_planned: actions.len(),
            actions: actions
                .iter()
                .map(|a| PlannedAction {
                    target: a.target,
                    trigger: a.trigger,
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn record_success(&mut self) {
        self.actions_succeeded = self.actions_succeeded.saturating_add(1);
    }

    pub fn record_failure(&mut self, issue: u64, cause: impl Into<String>) {
        self.actions_failed = self.actions_failed.saturating_add(1);
        self.failures.push(ActionFailure {
            issue,
            cause: cause.into(),
        });
    }

    pub fn record_skipped(&mut self) {
        self.actions_skipped = self.actions_skipped.saturating_add(1);
    }

    pub fn record_fetch_failure(&mut self, issue: u64, cause: impl Into<String>) {
        self.fetch_failures.push(FetchFailure {
            issue,
            cause: cause.into(),
        });
    }

    /// Every linked issue was fetched and no planned action failed
    pub fn is_success(&self) -> bool {
        self.actions_failed == 0 && self.fetch_failures.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parents evaluated: {}, actions planned: {}, succeeded: {}, failed: {}, skipped: {}",
            self.parents_evaluated,
            self.actions_planned,
            self.actions_succeeded,
            self.actions_failed,
            self.actions_skipped
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        for failure in &self.failures {
            write!(f, "\n  #{}: {}", failure.issue, failure.cause)?;
        }
        for failure in &self.fetch_failures {
            write!(f, "\n  #{} (not fetched): {}", failure.issue, failure.cause)?;
        }
        Ok(())
    }
}
