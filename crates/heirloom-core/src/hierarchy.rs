//! In-memory issue hierarchy for one run
//!
//! The graph is an index from issue number to issue plus two adjacency maps
//! (parent to children, child to parents). It is built once from the fetched
//! issues, validated, and then only read.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use gh_client::Issue;
use log::{debug, warn};

use crate::error::StructuralError;

static NO_LINKS: BTreeSet<u64> = BTreeSet::new();

/// Read-only snapshot of the issue hierarchy
#[derive(Debug, Clone, Default)]
pub struct HierarchyGraph {
    issues: BTreeMap<u64, Issue>,
    parents: BTreeMap<u64, BTreeSet<u64>>,
    children: BTreeMap<u64, BTreeSet<u64>>,
}

impl HierarchyGraph {
    /// Index `issues` and validate the hierarchy
    ///
    /// Links to issues outside the supplied set are dropped with a warning.
    /// A link declared on only one side is completed, so afterwards every
    /// issue's `parents` and `children` agree with each other. Fails if an
    /// issue number appears twice or the links form a cycle.
    pub fn build(issues: impl IntoIterator<Item = Issue>) -> Result<Self, StructuralError> {
        let mut graph = HierarchyGraph::default();
        for issue in issues {
            let number = issue.number;
            if graph.issues.insert(number, issue).is_some() {
                return Err(StructuralError::DuplicateIssue { number });
            }
        }

        // (parent, child) pairs as declared from each side
        let mut from_child: BTreeSet<(u64, u64)> = BTreeSet::new();
        let mut from_parent: BTreeSet<(u64, u64)> = BTreeSet::new();
        for issue in graph.issues.values() {
            for &parent in &issue.parents {
                if graph.issues.contains_key(&parent) {
                    from_child.insert((parent, issue.number));
                } else {
                    warn!(
                        "Dropping link from #{} to parent #{}: not in the fetched issues",
                        issue.number, parent
                    );
                }
            }
            for &child in &issue.children {
                if graph.issues.contains_key(&child) {
                    from_parent.insert((issue.number, child));
                } else {
                    warn!(
                        "Dropping link from #{} to sub-issue #{}: not in the fetched issues",
                        issue.number, child
                    );
                }
            }
        }

        for &(parent, child) in from_child.symmetric_difference(&from_parent) {
            debug!("Repairing one-sided link between #{} and sub-issue #{}", parent, child);
        }

        for (parent, child) in from_child.union(&from_parent).copied() {
            graph.children.entry(parent).or_default().insert(child);
            graph.parents.entry(child).or_default().insert(parent);
        }

        if let Some(issues) = graph.find_cycle() {
            return Err(StructuralError::Cycle { issues });
        }

        // Rewrite the stored links so callers see the repaired view
        let HierarchyGraph {
            issues,
            parents,
            children,
        } = &mut graph;
        for (number, issue) in issues.iter_mut() {
            issue.parents = parents
                .get(number)
                .map(|s| s.iter().copied().collect())
                .unwrap_or_default();
            issue.children = children
                .get(number)
                .map(|s| s.iter().copied().collect())
                .unwrap_or_default();
        }

        Ok(graph)
    }

    /// Depth-first search over child links from every issue, in number order
    ///
    /// Returns the issues on the first cycle found, starting with the issue
    /// the search re-entered.
    fn find_cycle(&self) -> Option<Vec<u64>> {
        let mut visited: HashSet<u64> = HashSet::new();

        for &start in self.issues.keys() {
            if !visited.insert(start) {
                continue;
            }

            let mut path: Vec<u64> = vec![start];
            let mut on_path: HashSet<u64> = HashSet::from([start]);
            let mut stack = vec![self.children_set(start).iter()];

            while let Some(pending) = stack.last_mut() {
                match pending.next() {
                    Some(&child) => {
                        if on_path.contains(&child) {
                            let entry = path.iter().position(|&n| n == child).unwrap_or(0);
                            return Some(path[entry..].to_vec());
                        }
                        if visited.insert(child) {
                            path.push(child);
                            on_path.insert(child);
                            stack.push(self.children_set(child).iter());
                        }
                    }
                    None => {
                        stack.pop();
                        if let Some(done) = path.pop() {
                            on_path.remove(&done);
                        }
                    }
                }
            }
        }

        None
    }

    fn children_set(&self, number: u64) -> &BTreeSet<u64> {
        self.children.get(&number).unwrap_or(&NO_LINKS)
    }

    fn parents_set(&self, number: u64) -> &BTreeSet<u64> {
        self.parents.get(&number).unwrap_or(&NO_LINKS)
    }

    pub fn get(&self, number: u64) -> Option<&Issue> {
        self.issues.get(&number)
    }

    /// All issues in number order
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.values()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Direct parents of an issue, in number order
    pub fn parents_of(&self, number: u64) -> impl Iterator<Item = &Issue> {
        self.parents_set(number).iter().filter_map(|n| self.issues.get(n))
    }

    /// Direct sub-issues of an issue, in number order
    pub fn children_of(&self, number: u64) -> impl Iterator<Item = &Issue> {
        self.children_set(number).iter().filter_map(|n| self.issues.get(n))
    }

    /// Whether `number` is in the graph and has no parent
    pub fn is_root(&self, number: u64) -> bool {
        self.issues.contains_key(&number) && self.parents_set(number).is_empty()
    }

    /// Every ancestor of an issue, nearest first and roots last
    ///
    /// Issues at the same distance are ordered by number. An ancestor
    /// reachable along several paths is listed once, at its shortest
    /// distance.
    pub fn ancestors_of(&self, number: u64) -> Vec<&Issue> {
        self.walk(number, |n| self.parents_set(n))
    }

    /// Every descendant of an issue, breadth-first
    ///
    /// Shallower issues come first; issues at the same depth are ordered by
    /// number.
    pub fn descendants_of(&self, number: u64) -> Vec<&Issue> {
        self.walk(number, |n| self.children_set(n))
    }

    /// Level-by-level traversal from `number` along `next` links
    fn walk<'a, F>(&'a self, number: u64, next: F) -> Vec<&'a Issue>
    where
        F: Fn(u64) -> &'a BTreeSet<u64>,
    {
        let mut seen: HashSet<u64> = HashSet::from([number]);
        let mut found = Vec::new();
        let mut level: BTreeSet<u64> = next(number).clone();

        while !level.is_empty() {
            let mut next_level = BTreeSet::new();
            for n in level {
                if !seen.insert(n) {
                    continue;
                }
                if let Some(issue) = self.issues.get(&n) {
                    found.push(issue);
                }
                next_level.extend(next(n).iter().filter(|m| !seen.contains(*m)));
            }
            level = next_level;
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn issue(number: u64, parents: &[u64], children: &[u64]) -> Issue {
        let mut issue = Issue::new(number, format!("Issue {}", number), Utc::now());
        issue.parents = parents.to_vec();
        issue.children = children.to_vec();
        issue
    }

    fn numbers(issues: &[&Issue]) -> Vec<u64> {
        issues.iter().map(|i| i.number).collect()
    }

    /// 1 -> {2, 3}, 2 -> {4, 5}, 3 -> {6}, 5 -> {7}
    fn tree() -> HierarchyGraph {
        HierarchyGraph::build(vec![
            issue(1, &[], &[2, 3]),
            issue(2, &[1], &[4, 5]),
            issue(3, &[1], &[6]),
            issue(4, &[2], &[]),
            issue(5, &[2], &[7]),
            issue(6, &[3], &[]),
            issue(7, &[5], &[]),
        ])
        .unwrap()
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let graph = tree();
        assert_eq!(numbers(&graph.ancestors_of(7)), vec![5, 2, 1]);
        assert_eq!(numbers(&graph.ancestors_of(6)), vec![3, 1]);
        assert!(graph.ancestors_of(1).is_empty());
    }

    #[test]
    fn test_descendants_breadth_first() {
        let graph = tree();
        assert_eq!(numbers(&graph.descendants_of(1)), vec![2, 3, 4, 5, 6, 7]);
        assert_eq!(numbers(&graph.descendants_of(2)), vec![4, 5, 7]);
        assert!(graph.descendants_of(7).is_empty());
    }

    #[test]
    fn test_is_root() {
        let graph = tree();
        assert!(graph.is_root(1));
        assert!(!graph.is_root(2));
        assert!(!graph.is_root(99));
    }

    #[test]
    fn test_one_sided_links_are_repaired() {
        // 1 names 2 as child, 3 names 1 as parent; neither side is mirrored
        let graph = HierarchyGraph::build(vec![
            issue(1, &[], &[2]),
            issue(2, &[], &[]),
            issue(3, &[1], &[]),
        ])
        .unwrap();

        assert_eq!(graph.get(1).unwrap().children, vec![2, 3]);
        assert_eq!(graph.get(2).unwrap().parents, vec![1]);
        assert_eq!(graph.get(3).unwrap().parents, vec![1]);
        assert_eq!(numbers(&graph.children_of(1).collect::<Vec<_>>()), vec![2, 3]);
        assert_eq!(numbers(&graph.parents_of(3).collect::<Vec<_>>()), vec![1]);
    }

    #[test]
    fn test_out_of_scope_links_are_dropped() {
        let graph = HierarchyGraph::build(vec![issue(1, &[40], &[2, 41]), issue(2, &[1], &[])])
            .unwrap();

        assert!(graph.is_root(1));
        assert_eq!(graph.get(1).unwrap().parents, Vec::<u64>::new());
        assert_eq!(graph.get(1).unwrap().children, vec![2]);
        assert_eq!(numbers(&graph.descendants_of(1)), vec![2]);
    }

    #[test]
    fn test_duplicate_issue_rejected() {
        let result = HierarchyGraph::build(vec![issue(1, &[], &[]), issue(1, &[], &[])]);
        assert_eq!(
            result.unwrap_err(),
            StructuralError::DuplicateIssue { number: 1 }
        );
    }

    #[test]
    fn test_two_issue_cycle_rejected() {
        // A -> B -> A
        let result = HierarchyGraph::build(vec![issue(1, &[2], &[2]), issue(2, &[1], &[1])]);
        assert_eq!(
            result.unwrap_err(),
            StructuralError::Cycle { issues: vec![1, 2] }
        );
    }

    #[test]
    fn test_cycle_below_a_root_rejected() {
        // 1 -> 2 -> 3 -> 4 -> 2, declared from the child side only
        let result = HierarchyGraph::build(vec![
            issue(1, &[], &[]),
            issue(2, &[1, 4], &[]),
            issue(3, &[2], &[]),
            issue(4, &[3], &[]),
        ]);
        assert_eq!(
            result.unwrap_err(),
            StructuralError::Cycle {
                issues: vec![2, 3, 4]
            }
        );
    }

    #[test]
    fn test_rootless_cycle_rejected() {
        let result = HierarchyGraph::build(vec![
            issue(5, &[], &[6]),
            issue(6, &[], &[7]),
            issue(7, &[], &[5]),
        ]);
        assert!(matches!(result, Err(StructuralError::Cycle { .. })));
    }

    #[test]
    fn test_self_loop_rejected() {
        let result = HierarchyGraph::build(vec![issue(3, &[3], &[])]);
        assert_eq!(
            result.unwrap_err(),
            StructuralError::Cycle { issues: vec![3] }
        );
    }

    #[test]
    fn test_shared_descendant_is_not_a_cycle() {
        // diamond: 1 -> {2, 3} -> 4
        let graph = HierarchyGraph::build(vec![
            issue(1, &[], &[2, 3]),
            issue(2, &[], &[4]),
            issue(3, &[], &[4]),
            issue(4, &[], &[]),
        ])
        .unwrap();

        assert_eq!(numbers(&graph.ancestors_of(4)), vec![2, 3, 1]);
        assert_eq!(numbers(&graph.descendants_of(1)), vec![2, 3, 4]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = HierarchyGraph::build(Vec::new()).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 0);
    }
}
