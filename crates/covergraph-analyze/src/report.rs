//! The analysis service: centralities, communities, blind spots, and the
//! headline insights derived from them.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use covergraph_core::{MergeSource, MergedGraph};

use crate::centrality::{
    betweenness_centrality, closeness_centrality, clustering_coefficients, degree_centrality,
    NodeCentrality,
};
use crate::community::{detect_communities, Community};
use crate::view::GraphView;

/// A node this central with this little connectivity is bridging regions
/// of the graph that barely touch.
const BRIDGE_BETWEENNESS_MIN: f64 = 0.1;
const BRIDGE_DEGREE_MAX: f64 = 0.1;
/// Communities looser than this are flagged as thin coverage.
const SPARSE_COMMUNITY_DENSITY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlindSpotKind {
    IsolatedQuestion,
    BridgeGap,
    CommunityGap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
}

/// A structurally significant gap in knowledge-base coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlindSpot {
    pub kind: BlindSpotKind,
    pub severity: Severity,
    pub node_ids: Vec<String>,
    pub detail: String,
}

/// Full analysis output for one merged graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub centralities: BTreeMap<String, NodeCentrality>,
    pub communities: Vec<Community>,
    pub blind_spots: Vec<BlindSpot>,
    pub key_insights: Vec<String>,
    pub duration_ms: u64,
}

/// Batch analysis over a merged graph snapshot. Deterministic given its
/// input; an empty graph yields an empty (not erroneous) report.
pub struct GraphAnalysisService;

impl GraphAnalysisService {
    pub fn analyze(graph: &MergedGraph) -> AnalysisReport {
        let start = Instant::now();
        let view = GraphView::from_merged(graph);

        let degree = degree_centrality(&view);
        let closeness = closeness_centrality(&view);
        let betweenness = betweenness_centrality(&view);
        let clustering = clustering_coefficients(&view);

        let mut centralities = BTreeMap::new();
        for (i, id) in view.node_ids.iter().enumerate() {
            centralities.insert(
                id.clone(),
                NodeCentrality {
                    degree: degree[i],
                    closeness: closeness[i],
                    betweenness: betweenness[i],
                    clustering: clustering[i],
                },
            );
        }

        let communities = detect_communities(&view);
        let blind_spots = Self::blind_spots(&view, &degree, &betweenness, &communities);
        let key_insights = Self::key_insights(graph, &view, &degree, &betweenness, &communities);

        let report = AnalysisReport {
            centralities,
            communities,
            blind_spots,
            key_insights,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Analysis complete: {} nodes, {} communities, {} blind spots, {}ms",
            view.len(),
            report.communities.len(),
            report.blind_spots.len(),
            report.duration_ms
        );

        report
    }

    fn blind_spots(
        view: &GraphView,
        degree: &[f64],
        betweenness: &[f64],
        communities: &[Community],
    ) -> Vec<BlindSpot> {
        let mut spots = Vec::new();

        // Unanswered questions with no structure around them at all.
        for (i, id) in view.node_ids.iter().enumerate() {
            if view.sources[i] == MergeSource::User && degree[i] == 0.0 {
                spots.push(BlindSpot {
                    kind: BlindSpotKind::IsolatedQuestion,
                    severity: Severity::High,
                    node_ids: vec![id.clone()],
                    detail: format!("question {} has no connection to any knowledge", id),
                });
            }
        }

        for (i, id) in view.node_ids.iter().enumerate() {
            if betweenness[i] > BRIDGE_BETWEENNESS_MIN && degree[i] < BRIDGE_DEGREE_MAX {
                spots.push(BlindSpot {
                    kind: BlindSpotKind::BridgeGap,
                    severity: Severity::Medium,
                    node_ids: vec![id.clone()],
                    detail: format!(
                        "node {} bridges regions of the graph with few direct links",
                        id
                    ),
                });
            }
        }

        for community in communities {
            if community.density < SPARSE_COMMUNITY_DENSITY {
                spots.push(BlindSpot {
                    kind: BlindSpotKind::CommunityGap,
                    severity: Severity::Medium,
                    node_ids: community.node_ids.clone(),
                    detail: format!(
                        "community {} is loosely connected (density {:.2})",
                        community.id, community.density
                    ),
                });
            }
        }

        spots
    }

    fn key_insights(
        graph: &MergedGraph,
        view: &GraphView,
        degree: &[f64],
        betweenness: &[f64],
        communities: &[Community],
    ) -> Vec<String> {
        let mut insights = Vec::new();

        insights.push(format!(
            "{}% of user questions are covered by the knowledge base ({} of {} matched)",
            graph.overlap_analysis.coverage_rate,
            graph.overlap_analysis.overlap,
            graph.overlap_analysis.overlap + graph.overlap_analysis.user_only
        ));

        if let Some((i, score)) = max_by_score(degree) {
            if *score > 0.0 {
                insights.push(format!(
                    "hub: {} holds the most connections (degree centrality {:.2})",
                    view.node_ids[i], score
                ));
            }
        }

        if let Some((i, score)) = max_by_score(betweenness) {
            if *score > 0.0 {
                insights.push(format!(
                    "bridge: {} carries the most shortest paths (betweenness {:.2})",
                    view.node_ids[i], score
                ));
            }
        }

        if let Some(largest) = communities.iter().max_by_key(|c| c.size) {
            insights.push(format!(
                "largest topic cluster has {} nodes (density {:.2})",
                largest.size, largest.density
            ));
        }

        insights
    }
}

/// First index with the maximum score, if any; ties keep node order.
fn max_by_score(scores: &[f64]) -> Option<(usize, &f64)> {
    let mut best: Option<(usize, &f64)> = None;
    for (i, score) in scores.iter().enumerate() {
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((i, score));
        }
    }
    best
}
