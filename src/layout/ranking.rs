use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use crate::config::ConvergencePolicy;
use crate::ir::{Edge, Node};

/// Tier of every node, measured in hops from the start node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierAssignment {
    pub tiers: HashMap<String, usize>,
    /// Deepest tier among nodes the traversal reached.
    pub max_reached: usize,
    /// Nodes with no path from the start, in input order.
    pub unreached: Vec<String>,
}

impl TierAssignment {
    pub fn tier_of(&self, id: &str) -> Option<usize> {
        self.tiers.get(id).copied()
    }

    /// Reached nodes never sit below `max_reached`; the trailing row does.
    pub fn is_reached(&self, id: &str) -> bool {
        self.tier_of(id).is_some_and(|tier| tier <= self.max_reached)
    }

    /// Row index of the trailing row, when one exists.
    pub fn trailing_tier(&self) -> Option<usize> {
        if self.unreached.is_empty() {
            None
        } else {
            Some(self.max_reached + 1)
        }
    }
}

/// Forward adjacency restricted to `node_set`, plus edges leaving `start_id`.
/// Duplicate edges collapse into one entry; targets keep first-seen order.
pub(super) fn build_adjacency<'a>(
    node_set: &HashSet<&'a str>,
    edges: &'a [Edge],
    start_id: &str,
) -> HashMap<&'a str, Vec<&'a str>> {
    let mut adj: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
    for edge in edges {
        let from = edge.from.as_str();
        let to = edge.to.as_str();
        let from_known = node_set.contains(from) || from == start_id;
        if !from_known || !node_set.contains(to) {
            debug!("ignoring edge {from} -> {to}: endpoint outside the flow");
            continue;
        }
        let targets = adj.entry(from).or_default();
        if !targets.contains(&to) {
            targets.push(to);
        }
    }
    adj
}

pub fn assign_tiers(
    nodes: &[Node],
    edges: &[Edge],
    start_id: &str,
    policy: ConvergencePolicy,
) -> TierAssignment {
    if nodes.is_empty() {
        return TierAssignment::default();
    }

    let node_set: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let adj = build_adjacency(&node_set, edges, start_id);

    let mut seeds: Vec<&str> = adj.get(start_id).cloned().unwrap_or_default();
    if seeds.is_empty() {
        debug!(
            "no edges leave {start_id}; seeding traversal with {}",
            nodes[0].id
        );
        seeds.push(nodes[0].id.as_str());
    }

    // Longest simple path has at most `len` nodes, so no tier can exceed it.
    let tier_limit = node_set.len();

    let mut tiers: HashMap<&str, usize> = HashMap::new();
    let mut expanded: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for seed in seeds {
        if tiers.insert(seed, 1).is_none() {
            queue.push_back(seed);
        }
    }

    while let Some(node) = queue.pop_front() {
        let tier = tiers.get(node).copied().unwrap_or(1);
        expanded.insert(node);
        let Some(nexts) = adj.get(node) else {
            continue;
        };
        for &next in nexts {
            let candidate = tier + 1;
            match tiers.get_mut(next) {
                None => {
                    tiers.insert(next, candidate);
                    queue.push_back(next);
                }
                Some(existing) if candidate > *existing => match policy {
                    // A node raised while still queued hands the new tier to its
                    // successors when it is expanded; one raised after expansion
                    // leaves them where they are.
                    ConvergencePolicy::SinglePass => {
                        *existing = candidate;
                        if expanded.contains(next) {
                            debug!(
                                "{next} moved to tier {candidate} after its successors were tiered"
                            );
                        } else {
                            debug!("{next} moved to tier {candidate} before expansion");
                        }
                    }
                    ConvergencePolicy::Propagate => {
                        if candidate <= tier_limit {
                            *existing = candidate;
                            queue.push_back(next);
                        }
                    }
                },
                Some(_) => {}
            }
        }
    }

    let max_reached = tiers.values().copied().max().unwrap_or(0);
    let mut assignment = TierAssignment {
        tiers: HashMap::with_capacity(nodes.len()),
        max_reached,
        unreached: Vec::new(),
    };
    for node in nodes {
        match tiers.get(node.id.as_str()) {
            Some(tier) => {
                assignment.tiers.insert(node.id.clone(), *tier);
            }
            None => {
                if !assignment.tiers.contains_key(&node.id) {
                    assignment.tiers.insert(node.id.clone(), max_reached + 1);
                    assignment.unreached.push(node.id.clone());
                }
            }
        }
    }
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter().map(|id| Node::new(*id)).collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
        pairs.iter().map(|(a, b)| Edge::new(*a, *b)).collect()
    }

    #[test]
    fn fan_out_from_start() {
        let t = assign_tiers(
            &nodes(&["a", "b", "c"]),
            &edges(&[("start", "a"), ("a", "b"), ("a", "c")]),
            "start",
            ConvergencePolicy::SinglePass,
        );
        assert_eq!(t.tier_of("a"), Some(1));
        assert_eq!(t.tier_of("b"), Some(2));
        assert_eq!(t.tier_of("c"), Some(2));
        assert!(t.unreached.is_empty());
        assert_eq!(t.trailing_tier(), None);
    }

    #[test]
    fn convergent_paths_keep_deepest_tier() {
        // start -> a -> b -> d and start -> d: d sits below b, not beside a.
        let t = assign_tiers(
            &nodes(&["a", "b", "d"]),
            &edges(&[("start", "a"), ("start", "d"), ("a", "b"), ("b", "d")]),
            "start",
            ConvergencePolicy::SinglePass,
        );
        assert_eq!(t.tier_of("d"), Some(3));
    }

    #[test]
    fn single_pass_leaves_successors_of_bumped_nodes_in_place() {
        // c is first tiered at 2 via a, and expanded (d = 3), then raised to 3 via x.
        let n = nodes(&["a", "b", "x", "c", "d"]);
        let e = edges(&[
            ("start", "a"),
            ("start", "b"),
            ("a", "c"),
            ("b", "x"),
            ("x", "c"),
            ("c", "d"),
        ]);
        let single = assign_tiers(&n, &e, "start", ConvergencePolicy::SinglePass);
        assert_eq!(single.tier_of("c"), Some(3));
        assert_eq!(single.tier_of("d"), Some(3));

        let propagated = assign_tiers(&n, &e, "start", ConvergencePolicy::Propagate);
        assert_eq!(propagated.tier_of("c"), Some(3));
        assert_eq!(propagated.tier_of("d"), Some(4));
    }

    #[test]
    fn single_pass_raise_before_expansion_reaches_successors() {
        // b is queued at 1 from start, raised to 2 via a, then expanded.
        let t = assign_tiers(
            &nodes(&["a", "b", "c"]),
            &edges(&[("start", "a"), ("start", "b"), ("a", "b"), ("b", "c")]),
            "start",
            ConvergencePolicy::SinglePass,
        );
        assert_eq!(t.tier_of("b"), Some(2));
        assert_eq!(t.tier_of("c"), Some(3));
        assert!(t.is_reached("c"));
    }

    #[test]
    fn falls_back_to_first_node_without_start_edges() {
        let t = assign_tiers(
            &nodes(&["a", "b", "c"]),
            &edges(&[("a", "b")]),
            "start",
            ConvergencePolicy::SinglePass,
        );
        assert_eq!(t.tier_of("a"), Some(1));
        assert_eq!(t.tier_of("b"), Some(2));
        assert_eq!(t.tier_of("c"), Some(3));
        assert_eq!(t.unreached, vec!["c".to_string()]);
        assert!(!t.is_reached("c"));
    }

    #[test]
    fn disconnected_nodes_share_trailing_tier() {
        let t = assign_tiers(
            &nodes(&["a", "b", "lonely", "island"]),
            &edges(&[("start", "a"), ("a", "b"), ("island", "lonely")]),
            "start",
            ConvergencePolicy::SinglePass,
        );
        assert_eq!(t.max_reached, 2);
        assert_eq!(t.tier_of("lonely"), Some(3));
        assert_eq!(t.tier_of("island"), Some(3));
        assert_eq!(t.trailing_tier(), Some(3));
    }

    #[test]
    fn dangling_and_duplicate_edges_are_ignored() {
        let t = assign_tiers(
            &nodes(&["a", "b"]),
            &edges(&[
                ("start", "a"),
                ("start", "a"),
                ("ghost", "b"),
                ("a", "ghost"),
                ("a", "b"),
                ("a", "b"),
            ]),
            "start",
            ConvergencePolicy::SinglePass,
        );
        assert_eq!(t.tier_of("a"), Some(1));
        assert_eq!(t.tier_of("b"), Some(2));
        assert_eq!(t.tiers.len(), 2);
    }

    #[test]
    fn cycles_terminate_under_both_policies() {
        let n = nodes(&["a", "b", "c"]);
        let e = edges(&[("start", "a"), ("a", "b"), ("b", "c"), ("c", "a")]);
        for policy in [ConvergencePolicy::SinglePass, ConvergencePolicy::Propagate] {
            let t = assign_tiers(&n, &e, "start", policy);
            assert_eq!(t.tiers.len(), 3);
            assert!(t.tiers.values().all(|tier| *tier <= 4));
        }
    }

    #[test]
    fn empty_input_yields_nothing() {
        let t = assign_tiers(&[], &edges(&[("start", "a")]), "start", ConvergencePolicy::SinglePass);
        assert!(t.tiers.is_empty());
        assert_eq!(t.max_reached, 0);
    }
}
