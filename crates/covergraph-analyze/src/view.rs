//! Dense undirected adjacency view over a merged graph.
//!
//! The merged graph arrives as id-keyed nodes and links; the algorithms
//! want dense indices and symmetric neighbor lists. The view is built once
//! per analysis run and shared by every algorithm.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};

use covergraph_core::{MergeSource, MergedGraph};

/// Immutable adjacency view with dense `0..n` node indices.
pub struct GraphView {
    /// Dense index → node id.
    pub node_ids: Vec<String>,
    /// Dense index → merge source of the node.
    pub sources: Vec<MergeSource>,
    /// Undirected, deduplicated neighbor lists (no self loops).
    pub neighbors: Vec<Vec<usize>>,
}

impl GraphView {
    pub fn from_merged(graph: &MergedGraph) -> Self {
        let mut pg: DiGraph<usize, f64> = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();

        let mut node_ids = Vec::with_capacity(graph.nodes.len());
        let mut sources = Vec::with_capacity(graph.nodes.len());
        for (dense, node) in graph.nodes.iter().enumerate() {
            let idx = pg.add_node(dense);
            index.insert(node.id.as_str(), idx);
            node_ids.push(node.id.clone());
            sources.push(node.source);
        }

        for link in &graph.links {
            // Links referencing nodes outside the merged set are skipped.
            if let (Some(&a), Some(&b)) = (
                index.get(link.source.as_str()),
                index.get(link.target.as_str()),
            ) {
                if a != b {
                    pg.add_edge(a, b, link.weight);
                }
            }
        }

        let mut neighbors = vec![Vec::new(); node_ids.len()];
        for idx in pg.node_indices() {
            let dense = pg[idx];
            let mut seen = HashSet::new();
            for other in pg.neighbors_undirected(idx) {
                let other_dense = pg[other];
                if other_dense != dense && seen.insert(other_dense) {
                    neighbors[dense].push(other_dense);
                }
            }
            neighbors[dense].sort_unstable();
        }

        Self {
            node_ids,
            sources,
            neighbors,
        }
    }

    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    pub fn degree(&self, node: usize) -> usize {
        self.neighbors[node].len()
    }

    /// Count of undirected edges with both endpoints inside `members`.
    pub fn internal_edges(&self, members: &HashSet<usize>) -> usize {
        let mut doubled = 0;
        for &node in members {
            doubled += self.neighbors[node]
                .iter()
                .filter(|n| members.contains(n))
                .count();
        }
        doubled / 2
    }
}
