//! Turning selected parents into refresh actions

use std::collections::BTreeMap;

use gh_client::Issue;
use log::{debug, info};
use serde::Serialize;

use crate::activity::ActivityEvaluator;
use crate::hierarchy::HierarchyGraph;

/// A comment to post on `target` because `trigger` was recently active
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshAction {
    pub target: u64,
    /// Descendant whose activity qualified the target
    pub trigger: u64,
    pub message: String,
}

/// Plan at most one refresh per selected parent
///
/// A parent is refreshed when one of its descendants is recently active.
/// The trigger is the first such descendant breadth-first from the parent,
/// lowest number first within a level. Closed parents and parents whose
/// own activity is the only activity are left alone. In all-ancestors mode
/// every selected parent has an active descendant, so all open ones are
/// refreshed.
///
/// The result is ordered by target number.
pub fn plan(
    graph: &HierarchyGraph,
    selected: &[&Issue],
    evaluator: &ActivityEvaluator,
    message_template: &str,
) -> Vec<RefreshAction> {
    let mut actions: BTreeMap<u64, RefreshAction> = BTreeMap::new();

    for parent in selected {
        if actions.contains_key(&parent.number) {
            continue;
        }
        if !parent.is_open() {
            debug!("Skipping closed parent #{}", parent.number);
            continue;
        }

        let trigger = graph
            .descendants_of(parent.number)
            .into_iter()
            .find(|d| evaluator.is_recently_active(d));

        match trigger {
            Some(trigger) => {
                info!(
                    "Refreshing #{} ({}): sub-issue #{} is active",
                    parent.number, parent.title, trigger.number
                );
                actions.insert(
                    parent.number,
                    RefreshAction {
                        target: parent.number,
                        trigger: trigger.number,
                        message: render_message(
                            message_template,
                            trigger.number,
                            evaluator.threshold_days(),
                        ),
                    },
                );
            }
            None => debug!("No recent sub-issue activity under #{}", parent.number),
        }
    }

    actions.into_values().collect()
}

/// Fill in `{trigger}` and `{days}`
pub fn render_message(template: &str, trigger: u64, days: u32) -> String {
    template
        .replace("{trigger}", &format!("#{}", trigger))
        .replace("{days}", &days.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::select_parents;
    use chrono::{TimeDelta, TimeZone, Utc};
    use gh_client::IssueState;
    use heirloom_config::{ParentFilters, SelectionMode};
    use std::collections::HashSet;

    const TEMPLATE: &str = "Kept alive by {trigger} ({days} days)";

    fn evaluator() -> ActivityEvaluator {
        ActivityEvaluator::new(30, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
    }

    fn issue(number: u64, days_ago: i64, parents: &[u64]) -> Issue {
        let at = evaluator().now() - TimeDelta::days(days_ago);
        let mut issue = Issue::new(number, format!("Issue {}", number), at);
        issue.parents = parents.to_vec();
        issue
    }

    fn epic(number: u64, days_ago: i64, parents: &[u64]) -> Issue {
        let mut issue = issue(number, days_ago, parents);
        issue.labels = vec!["epic".to_string()];
        issue
    }

    fn epic_filters() -> SelectionMode {
        SelectionMode::Filters(ParentFilters {
            labels: ["epic".to_string()].into_iter().collect(),
            types: Default::default(),
        })
    }

    fn plan_for(graph: &HierarchyGraph, selection: &SelectionMode) -> Vec<RefreshAction> {
        let evaluator = evaluator();
        let selected = select_parents(graph, selection, &evaluator);
        plan(graph, &selected, &evaluator, TEMPLATE)
    }

    /// Two epics sharing active sub-issues at several depths
    fn nested() -> HierarchyGraph {
        HierarchyGraph::build(vec![
            epic(1, 90, &[]),
            epic(2, 90, &[1]),
            issue(3, 90, &[1]),
            issue(4, 2, &[2]),
            issue(5, 90, &[3]),
            issue(6, 1, &[3]),
            issue(7, 1, &[2]),
        ])
        .unwrap()
    }

    #[test]
    fn test_trigger_is_shallowest_lowest_numbered() {
        let actions = plan_for(&nested(), &epic_filters());

        assert_eq!(
            actions,
            vec![
                RefreshAction {
                    target: 1,
                    trigger: 4,
                    message: "Kept alive by #4 (30 days)".to_string(),
                },
                RefreshAction {
                    target: 2,
                    trigger: 4,
                    message: "Kept alive by #4 (30 days)".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let graph = nested();
        let first = plan_for(&graph, &epic_filters());
        let second = plan_for(&graph, &epic_filters());
        assert_eq!(first, second);

        let all_first = plan_for(&graph, &SelectionMode::AllAncestors);
        let all_second = plan_for(&graph, &SelectionMode::AllAncestors);
        assert_eq!(all_first, all_second);
    }

    #[test]
    fn test_no_duplicate_targets() {
        let graph = nested();
        let evaluator = evaluator();
        let selected = select_parents(&graph, &epic_filters(), &evaluator);
        // the same parent passed twice still yields one action
        let doubled: Vec<&Issue> = selected.iter().chain(selected.iter()).copied().collect();
        let actions = plan(&graph, &doubled, &evaluator, TEMPLATE);

        let targets: HashSet<u64> = actions.iter().map(|a| a.target).collect();
        assert_eq!(targets.len(), actions.len());
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn test_closed_parent_never_refreshed() {
        let mut closed = epic(1, 90, &[]);
        closed.state = IssueState::Closed;
        let graph = HierarchyGraph::build(vec![closed, issue(2, 0, &[1])]).unwrap();

        assert!(plan_for(&graph, &epic_filters()).is_empty());
        assert!(plan_for(&graph, &SelectionMode::AllAncestors).is_empty());
    }

    #[test]
    fn test_parent_own_activity_does_not_count() {
        let graph = HierarchyGraph::build(vec![epic(1, 0, &[]), issue(2, 90, &[1])]).unwrap();
        assert!(plan_for(&graph, &epic_filters()).is_empty());
    }

    #[test]
    fn test_childless_parent_not_refreshed() {
        let graph = HierarchyGraph::build(vec![epic(1, 0, &[])]).unwrap();
        assert!(plan_for(&graph, &epic_filters()).is_empty());
    }

    #[test]
    fn test_all_ancestors_refreshes_each_once() {
        // Root(1) -> A(2) -> Leaf(3)
        let graph = HierarchyGraph::build(vec![
            issue(1, 90, &[]),
            issue(2, 90, &[1]),
            issue(3, 0, &[2]),
        ])
        .unwrap();

        let actions = plan_for(&graph, &SelectionMode::AllAncestors);
        let targets: Vec<(u64, u64)> = actions.iter().map(|a| (a.target, a.trigger)).collect();
        assert_eq!(targets, vec![(1, 3), (2, 3)]);
    }

    #[test]
    fn test_render_message() {
        assert_eq!(render_message("{trigger}/{days}/{trigger}", 12, 5), "#12/5/#12");
        assert_eq!(render_message("static text", 12, 5), "static text");
    }
}
