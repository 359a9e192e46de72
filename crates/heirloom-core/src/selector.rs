//! Choosing which issues to protect

use std::collections::BTreeMap;

use gh_client::Issue;
use heirloom_config::{ParentFilters, SelectionMode};

use crate::activity::ActivityEvaluator;
use crate::hierarchy::HierarchyGraph;

/// Issues to protect under `selection`, in number order without duplicates
///
/// With [`SelectionMode::Filters`] an issue is selected when one of its
/// labels or its issue type is configured (exact, case-sensitive match).
/// With [`SelectionMode::AllAncestors`] the selection is every ancestor of
/// any recently active issue; labels and types play no part.
pub fn select_parents<'g>(
    graph: &'g HierarchyGraph,
    selection: &SelectionMode,
    evaluator: &ActivityEvaluator,
) -> Vec<&'g Issue> {
    match selection {
        SelectionMode::Filters(filters) => graph
            .issues()
            .filter(|issue| matches_filters(issue, filters))
            .collect(),
        SelectionMode::AllAncestors => {
            let mut selected: BTreeMap<u64, &Issue> = BTreeMap::new();
            for active in graph.issues().filter(|i| evaluator.is_recently_active(i)) {
                for ancestor in graph.ancestors_of(active.number) {
                    selected.insert(ancestor.number, ancestor);
                }
            }
            selected.into_values().collect()
        }
    }
}

fn matches_filters(issue: &Issue, filters: &ParentFilters) -> bool {
    issue.labels.iter().any(|label| filters.labels.contains(label))
        || issue
            .issue_type
            .as_ref()
            .is_some_and(|t| filters.types.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn evaluator() -> ActivityEvaluator {
        ActivityEvaluator::new(30, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
    }

    fn issue(number: u64, days_ago: i64, parents: &[u64]) -> Issue {
        let at = evaluator().now() - TimeDelta::days(days_ago);
        let mut issue = Issue::new(number, format!("Issue {}", number), at);
        issue.parents = parents.to_vec();
        issue
    }

    fn filters(labels: &[&str], types: &[&str]) -> SelectionMode {
        SelectionMode::Filters(ParentFilters {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            types: types.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn numbers(issues: &[&Issue]) -> Vec<u64> {
        issues.iter().map(|i| i.number).collect()
    }

    #[test]
    fn test_label_or_type_match() {
        let mut epic = issue(1, 100, &[]);
        epic.labels = vec!["epic".to_string()];
        let mut typed = issue(2, 100, &[]);
        typed.issue_type = Some("Initiative".to_string());
        let mut both = issue(3, 100, &[]);
        both.labels = vec!["epic".to_string(), "bug".to_string()];
        both.issue_type = Some("Initiative".to_string());
        let mut wrong_case = issue(4, 100, &[]);
        wrong_case.labels = vec!["Epic".to_string()];
        let plain = issue(5, 100, &[]);

        let graph = HierarchyGraph::build(vec![epic, typed, both, wrong_case, plain]).unwrap();
        let selected = select_parents(&graph, &filters(&["epic"], &["Initiative"]), &evaluator());

        assert_eq!(numbers(&selected), vec![1, 2, 3]);
    }

    #[test]
    fn test_no_matching_filters_selects_nothing() {
        let graph = HierarchyGraph::build(vec![issue(1, 0, &[]), issue(2, 0, &[1])]).unwrap();
        let selected = select_parents(&graph, &filters(&["epic"], &[]), &evaluator());
        assert!(selected.is_empty());
    }

    #[test]
    fn test_all_ancestors_of_active_leaf() {
        // Root(1) -> A(2) -> Leaf(3), only the leaf is active
        let graph = HierarchyGraph::build(vec![
            issue(1, 90, &[]),
            issue(2, 60, &[1]),
            issue(3, 1, &[2]),
        ])
        .unwrap();

        let selected = select_parents(&graph, &SelectionMode::AllAncestors, &evaluator());
        assert_eq!(numbers(&selected), vec![1, 2]);
    }

    #[test]
    fn test_all_ancestors_deduplicates_shared_ancestors() {
        // 1 -> {2, 3}, both leaves active, 4 is an unrelated stale root
        let graph = HierarchyGraph::build(vec![
            issue(1, 90, &[]),
            issue(2, 3, &[1]),
            issue(3, 5, &[1]),
            issue(4, 90, &[]),
        ])
        .unwrap();

        let selected = select_parents(&graph, &SelectionMode::AllAncestors, &evaluator());
        assert_eq!(numbers(&selected), vec![1]);
    }

    #[test]
    fn test_all_ancestors_ignores_labels() {
        let mut labelled = issue(1, 90, &[]);
        labelled.labels = vec!["epic".to_string()];
        let graph = HierarchyGraph::build(vec![labelled, issue(2, 90, &[1])]).unwrap();

        // nothing is active, so the label does not matter
        let selected = select_parents(&graph, &SelectionMode::AllAncestors, &evaluator());
        assert!(selected.is_empty());
    }
}
