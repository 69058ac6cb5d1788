//! The merge algorithm.
//!
//! Each run operates on fresh snapshots of both graphs and a fresh vector
//! index, so reruns on unchanged inputs yield identical output and no
//! partial state is ever visible outside a run.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use covergraph_core::{
    rel, CompanyGraph, GraphEdge, MergeSource, MergedDetail, MergedGraph, MergedNode, Origin,
    OverlapAnalysis, SimilarityMatch, UserGraph,
};
use covergraph_embed::{EmbeddingBackend, VectorIndex};

/// Merges a company graph and a user graph via embedding similarity.
pub struct MergeEngine {
    backend: Arc<dyn EmbeddingBackend>,
    threshold: f64,
}

impl MergeEngine {
    /// `threshold` is the minimum cosine similarity for a question to count
    /// as covered; callers validate it against `(0, 1)` via config.
    pub fn new(backend: Arc<dyn EmbeddingBackend>, threshold: f64) -> Self {
        Self { backend, threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Run the merge: index company knowledge, match every user question
    /// against it (best match above threshold, at most one per question),
    /// and assemble the merged graph plus overlap summary.
    pub async fn merge(&self, company: &CompanyGraph, user: &UserGraph) -> MergedGraph {
        let index = self.index_knowledge(company).await;
        let matches = self.match_questions(&index, user).await;

        let mut nodes: Vec<MergedNode> = Vec::with_capacity(user.questions.len() + company.nodes.len());
        let mut links: Vec<GraphEdge> = Vec::new();
        let mut matched = 0_usize;

        for (question, best) in user.questions.iter().zip(matches.iter()) {
            match best {
                Some(m) => {
                    matched += 1;
                    links.push(GraphEdge::new(
                        &m.user_id,
                        &m.company_id,
                        rel::MATCHES,
                        m.similarity,
                    ));
                    nodes.push(MergedNode {
                        id: question.id.clone(),
                        label: question.content.clone(),
                        source: MergeSource::Both,
                        overlap_score: Some(m.similarity),
                        matched_id: Some(m.company_id.clone()),
                        detail: MergedDetail::Question(question.clone()),
                    });
                }
                None => nodes.push(MergedNode {
                    id: question.id.clone(),
                    label: question.content.clone(),
                    source: MergeSource::User,
                    overlap_score: None,
                    matched_id: None,
                    detail: MergedDetail::Question(question.clone()),
                }),
            }
        }

        for node in &company.nodes {
            nodes.push(MergedNode {
                id: node.id.clone(),
                label: node.name.clone(),
                source: MergeSource::Company,
                overlap_score: None,
                matched_id: None,
                detail: MergedDetail::Company(node.clone()),
            });
        }

        // Carry both graphs' internal structure so the analysis service has
        // real topology, not just the match edges.
        links.extend(company.edges.iter().cloned());
        links.extend(
            user.edges
                .iter()
                .filter(|e| e.relationship == rel::RELATED)
                .cloned(),
        );

        let overlap_analysis = OverlapAnalysis {
            total_nodes: nodes.len(),
            user_only: user.questions.len() - matched,
            company_only: company.nodes.len(),
            overlap: matched,
            coverage_rate: OverlapAnalysis::coverage_rate(matched, user.questions.len()),
        };

        info!(
            "Merge complete: {} nodes, {} links, overlap={}, coverage={}%",
            overlap_analysis.total_nodes,
            links.len(),
            overlap_analysis.overlap,
            overlap_analysis.coverage_rate
        );

        MergedGraph {
            nodes,
            links,
            overlap_analysis,
        }
    }

    /// Populate a fresh index with every knowledge node, in graph order.
    async fn index_knowledge(&self, company: &CompanyGraph) -> VectorIndex {
        let mut index = VectorIndex::new(self.backend.clone());
        for node in company.knowledge_nodes() {
            let tags: Vec<&str> = node.tags.iter().map(String::as_str).collect();
            let text = format!("{} {} {}", node.name, node.description, tags.join(" "));
            index
                .add(
                    text.trim(),
                    serde_json::json!({ "nodeId": node.id }),
                    Origin::Company,
                )
                .await;
        }
        index
    }

    /// Best company match per question, aligned with question order.
    /// `None` means the question is uncovered at this threshold.
    ///
    /// Matches are exclusive: a knowledge node covers at most one question,
    /// claimed in question creation order, which keeps
    /// `overlap <= min(questions, knowledge nodes)` at every threshold.
    async fn match_questions(
        &self,
        index: &VectorIndex,
        user: &UserGraph,
    ) -> Vec<Option<SimilarityMatch>> {
        let mut claimed: HashSet<String> = HashSet::new();
        let mut matches = Vec::with_capacity(user.questions.len());
        for question in &user.questions {
            let hits = index
                .find_most_similar(&question.content, self.threshold, Some(Origin::Company), 1)
                .await;
            let best = hits.into_iter().next().and_then(|hit| {
                let company_id = hit.record.metadata["nodeId"].as_str()?.to_string();
                if !claimed.insert(company_id.clone()) {
                    return None;
                }
                Some(SimilarityMatch {
                    user_id: question.id.clone(),
                    company_id,
                    similarity: hit.similarity,
                })
            });
            matches.push(best);
        }
        matches
    }
}
