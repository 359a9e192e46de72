use chrono::{DateTime, TimeDelta, Utc};
use gh_client::Issue;

/// Whether `issue` saw activity within the last `threshold_days` before `now`
///
/// The boundary is inclusive: activity exactly `threshold_days` ago counts.
/// Timestamps after `now` (clock skew) count as active.
pub fn is_recently_active(issue: &Issue, threshold_days: u32, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(issue.last_activity) <= TimeDelta::days(i64::from(threshold_days))
}

/// Activity check with the threshold and the run's `now` fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityEvaluator {
    threshold_days: u32,
    now: DateTime<Utc>,
}

impl ActivityEvaluator {
    pub fn new(threshold_days: u32, now: DateTime<Utc>) -> Self {
        Self { threshold_days, now }
    }

    pub fn threshold_days(&self) -> u32 {
        self.threshold_days
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn is_recently_active(&self, issue: &Issue) -> bool {
        is_recently_active(issue, self.threshold_days, self.now)
    }
}
