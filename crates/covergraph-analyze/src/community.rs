//! Community detection via label propagation.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::view::GraphView;

/// Fixed number of propagation rounds; enough to converge on graphs in the
/// hundreds-to-low-thousands range while keeping runs deterministic.
const PROPAGATION_ROUNDS: usize = 5;

/// A detected community of two or more nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    /// The surviving propagation label (one of the member node ids).
    pub id: String,
    pub node_ids: Vec<String>,
    pub size: usize,
    /// `internal_edges / (size * (size - 1) / 2)`, always in `[0, 1]`.
    pub density: f64,
}

/// Label propagation: every node starts as its own community; for five
/// fixed rounds each node adopts the majority label among its neighbors,
/// ties resolved toward the lexicographically smaller label. Communities
/// with a single member are discarded.
pub fn detect_communities(view: &GraphView) -> Vec<Community> {
    let n = view.len();
    let mut labels: Vec<String> = view.node_ids.clone();

    for _ in 0..PROPAGATION_ROUNDS {
        for node in 0..n {
            if view.neighbors[node].is_empty() {
                continue;
            }
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for &neighbor in &view.neighbors[node] {
                *counts.entry(labels[neighbor].as_str()).or_insert(0) += 1;
            }
            // BTreeMap iterates labels in ascending order, so the first
            // maximal count is the lexicographically smallest winner.
            let mut winner: Option<(&str, usize)> = None;
            for (label, count) in &counts {
                if winner.map_or(true, |(_, best)| *count > best) {
                    winner = Some((label, *count));
                }
            }
            if let Some((label, _)) = winner {
                labels[node] = label.to_string();
            }
        }
    }

    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (node, label) in labels.iter().enumerate() {
        groups.entry(label.clone()).or_default().push(node);
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(label, members)| {
            let member_set: HashSet<usize> = members.iter().copied().collect();
            let size = members.len();
            let possible = size * (size - 1) / 2;
            let density = if possible == 0 {
                0.0
            } else {
                view.internal_edges(&member_set) as f64 / possible as f64
            };
            Community {
                id: label,
                node_ids: members.into_iter().map(|m| view.node_ids[m].clone()).collect(),
                size,
                density,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::testutil::merged_graph;

    fn view(ids: &[&str], edges: &[(&str, &str)]) -> GraphView {
        GraphView::from_merged(&merged_graph(ids, edges))
    }

    #[test]
    fn test_k4_plus_isolated_node() {
        // Fully connected 4-node cluster plus one isolated node.
        let v = view(
            &["a", "b", "c", "d", "lonely"],
            &[
                ("a", "b"),
                ("a", "c"),
                ("a", "d"),
                ("b", "c"),
                ("b", "d"),
                ("c", "d"),
            ],
        );
        let communities = detect_communities(&v);
        assert_eq!(communities.len(), 1);
        assert_eq!(communities[0].size, 4);
        assert!((communities[0].density - 1.0).abs() < 1e-9);
        assert!(!communities[0].node_ids.contains(&"lonely".to_string()));
    }

    #[test]
    fn test_two_separate_clusters() {
        let v = view(
            &["a", "b", "c", "x", "y", "z"],
            &[
                ("a", "b"),
                ("b", "c"),
                ("a", "c"),
                ("x", "y"),
                ("y", "z"),
                ("x", "z"),
            ],
        );
        let communities = detect_communities(&v);
        assert_eq!(communities.len(), 2);
        assert!(communities.iter().all(|c| c.size == 3));
        assert!(communities.iter().all(|c| (c.density - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_density_bounds() {
        // Sparse chain: connected but loosely.
        let v = view(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")],
        );
        for community in detect_communities(&v) {
            assert!((0.0..=1.0).contains(&community.density));
        }
    }

    #[test]
    fn test_empty_graph() {
        let v = view(&[], &[]);
        assert!(detect_communities(&v).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let ids = ["a", "b", "c", "d"];
        let edges = [("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")];
        let first = detect_communities(&view(&ids, &edges));
        let second = detect_communities(&view(&ids, &edges));
        assert_eq!(
            first.iter().map(|c| c.id.clone()).collect::<Vec<_>>(),
            second.iter().map(|c| c.id.clone()).collect::<Vec<_>>()
        );
    }
}
