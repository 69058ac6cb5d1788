//! Centrality measures over the undirected adjacency view.
//!
//! All scores are normalized into `[0, 1]`. Every function degrades to
//! zeros on graphs too small for the measure to mean anything.

use serde::{Deserialize, Serialize};

use crate::view::GraphView;

/// Per-node centrality scores.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NodeCentrality {
    pub degree: f64,
    pub closeness: f64,
    pub betweenness: f64,
    pub clustering: f64,
}

/// Connection count normalized by the maximum possible, `n - 1`.
pub fn degree_centrality(view: &GraphView) -> Vec<f64> {
    let n = view.len();
    if n <= 1 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|i| view.degree(i) as f64 / (n - 1) as f64)
        .collect()
}

/// BFS distances and shortest-path counts from one source.
fn bfs(view: &GraphView, source: usize) -> (Vec<i64>, Vec<f64>) {
    let n = view.len();
    let mut dist = vec![-1_i64; n];
    let mut sigma = vec![0.0_f64; n];
    dist[source] = 0;
    sigma[source] = 1.0;

    let mut queue = std::collections::VecDeque::new();
    queue.push_back(source);
    while let Some(node) = queue.pop_front() {
        for &next in &view.neighbors[node] {
            if dist[next] < 0 {
                dist[next] = dist[node] + 1;
                queue.push_back(next);
            }
            if dist[next] == dist[node] + 1 {
                sigma[next] += sigma[node];
            }
        }
    }
    (dist, sigma)
}

/// `reachable / sum(distances)` per node; 0 for nodes reaching nothing.
pub fn closeness_centrality(view: &GraphView) -> Vec<f64> {
    (0..view.len())
        .map(|source| {
            let (dist, _) = bfs(view, source);
            let mut reachable = 0_usize;
            let mut total = 0_i64;
            for (node, &d) in dist.iter().enumerate() {
                if node != source && d > 0 {
                    reachable += 1;
                    total += d;
                }
            }
            if total == 0 {
                0.0
            } else {
                reachable as f64 / total as f64
            }
        })
        .collect()
}

/// Fraction of a node's neighbor pairs that are themselves connected;
/// 0 with fewer than two neighbors.
pub fn clustering_coefficients(view: &GraphView) -> Vec<f64> {
    (0..view.len())
        .map(|node| {
            let neighbors = &view.neighbors[node];
            if neighbors.len() < 2 {
                return 0.0;
            }
            let mut connected = 0_usize;
            for (i, &a) in neighbors.iter().enumerate() {
                for &b in neighbors.iter().skip(i + 1) {
                    if view.neighbors[a].binary_search(&b).is_ok() {
                        connected += 1;
                    }
                }
            }
            let possible = neighbors.len() * (neighbors.len() - 1) / 2;
            connected as f64 / possible as f64
        })
        .collect()
}

/// Approximate betweenness: for every node pair, shortest paths are counted
/// via BFS and each intermediate node is credited its share, normalized by
/// `(n-1)(n-2)/2`.
pub fn betweenness_centrality(view: &GraphView) -> Vec<f64> {
    let n = view.len();
    if n < 3 {
        return vec![0.0; n];
    }

    // BFS once per node; pair accounting then only needs lookups.
    let traversals: Vec<(Vec<i64>, Vec<f64>)> = (0..n).map(|s| bfs(view, s)).collect();

    let mut scores = vec![0.0_f64; n];
    for s in 0..n {
        let (dist_s, sigma_s) = &traversals[s];
        for t in (s + 1)..n {
            if dist_s[t] <= 0 {
                continue;
            }
            let (dist_t, sigma_t) = &traversals[t];
            let total_paths = sigma_s[t];
            if total_paths == 0.0 {
                continue;
            }
            for v in 0..n {
                if v == s || v == t {
                    continue;
                }
                // v lies on a shortest s-t path iff the two legs add up.
                if dist_s[v] > 0 && dist_t[v] > 0 && dist_s[v] + dist_t[v] == dist_s[t] {
                    scores[v] += sigma_s[v] * sigma_t[v] / total_paths;
                }
            }
        }
    }

    let norm = ((n - 1) * (n - 2)) as f64 / 2.0;
    scores.iter().map(|s| (s / norm).clamp(0.0, 1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::testutil::merged_graph;

    fn view(ids: &[&str], edges: &[(&str, &str)]) -> GraphView {
        GraphView::from_merged(&merged_graph(ids, edges))
    }

    #[test]
    fn test_degree_star() {
        // Hub connected to three leaves.
        let v = view(
            &["hub", "a", "b", "c"],
            &[("hub", "a"), ("hub", "b"), ("hub", "c")],
        );
        let degree = degree_centrality(&v);
        assert_eq!(degree[0], 1.0);
        assert!((degree[1] - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_degree_single_node() {
        let v = view(&["only"], &[]);
        assert_eq!(degree_centrality(&v), vec![0.0]);
    }

    #[test]
    fn test_closeness_path() {
        let v = view(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let closeness = closeness_centrality(&v);
        // Middle node: 2 reachable at distance 1 each.
        assert!((closeness[1] - 1.0).abs() < 1e-9);
        // Endpoint: distances 1 + 2.
        assert!((closeness[0] - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_closeness_isolated_is_zero() {
        let v = view(&["a", "b", "lonely"], &[("a", "b")]);
        assert_eq!(closeness_centrality(&v)[2], 0.0);
    }

    #[test]
    fn test_clustering_triangle() {
        let v = view(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("a", "c")]);
        for c in clustering_coefficients(&v) {
            assert!((c - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_clustering_bounds() {
        let v = view(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("a", "d"), ("b", "c")],
        );
        for c in clustering_coefficients(&v) {
            assert!((0.0..=1.0).contains(&c));
        }
        // "a" has 3 neighbors, 1 of 3 pairs connected.
        assert!((clustering_coefficients(&v)[0] - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_betweenness_path_middle() {
        let v = view(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let betweenness = betweenness_centrality(&v);
        // Only shortest a-c path runs through b; normalized by 1 pair.
        assert!((betweenness[1] - 1.0).abs() < 1e-9);
        assert_eq!(betweenness[0], 0.0);
        assert_eq!(betweenness[2], 0.0);
    }

    #[test]
    fn test_betweenness_splits_over_parallel_paths() {
        // Diamond: two equal-length a-d paths, through b and through c.
        let v = view(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        let betweenness = betweenness_centrality(&v);
        assert!((betweenness[1] - betweenness[2]).abs() < 1e-9);
        // Each carries half of the single a-d pair, over (n-1)(n-2)/2 = 3.
        assert!((betweenness[1] - 0.5 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_betweenness_bounds() {
        let v = view(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")],
        );
        for b in betweenness_centrality(&v) {
            assert!((0.0..=1.0).contains(&b));
        }
    }
}
