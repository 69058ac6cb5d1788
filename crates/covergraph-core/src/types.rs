//! Graph data model shared across the pipeline.
//!
//! Nodes carry a tagged kind rather than ad-hoc fields, so every consumer
//! can match on what a node is instead of probing for optional attributes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which side of the merge a vector or node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Company,
    User,
}

/// Edge relationship names used across both graphs.
pub mod rel {
    /// Product → knowledge containment.
    pub const CONTAINS: &str = "contains";
    /// Category → knowledge classification.
    pub const CATEGORIZES: &str = "categorizes";
    /// Weak cross-reference (tag or keyword overlap).
    pub const RELATED: &str = "related";
    /// Question → keyword.
    pub const ASKS_ABOUT: &str = "asks_about";
    /// Keyword → category.
    pub const BELONGS_TO: &str = "belongs_to";
    /// User question → company knowledge, weight = similarity.
    pub const MATCHES: &str = "matches";
}

/// A directed, weighted edge. Both graphs and the merged graph use this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub relationship: String,
    pub weight: f64,
}

impl GraphEdge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relationship: &str,
        weight: f64,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relationship: relationship.to_string(),
            weight,
        }
    }
}

/// Node kinds on the company side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyNodeKind {
    Product,
    Category,
    Knowledge,
}

impl CompanyNodeKind {
    /// Display color for the visualization layer.
    pub fn color(&self) -> &'static str {
        match self {
            CompanyNodeKind::Product => "#6366f1",
            CompanyNodeKind::Category => "#f59e0b",
            CompanyNodeKind::Knowledge => "#10b981",
        }
    }
}

/// A node in the company knowledge graph.
///
/// Company graphs are rebuilt wholesale from source records; nodes are never
/// partially updated after a build.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyNode {
    pub id: String,
    pub kind: CompanyNodeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_ids: Vec<String>,
    /// Percentage of linked knowledge children, 0..=100. Only meaningful
    /// for product nodes.
    pub coverage: u32,
    pub color: String,
}

/// Question sentiment as reported by the interaction-logging layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// A node in the user question graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuestionNode {
    pub id: String,
    pub content: String,
    pub keywords: Vec<String>,
    /// How many times this exact question was asked; always ≥ 1.
    pub frequency: u32,
    pub category: String,
    pub sentiment: Sentiment,
    pub last_asked: DateTime<Utc>,
    /// Up to 5 other questions sharing ≥ 2 keywords, highest overlap first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_ids: Vec<String>,
}

/// Company knowledge graph: products → categories → knowledge documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyGraph {
    pub nodes: Vec<CompanyNode>,
    pub edges: Vec<GraphEdge>,
}

impl CompanyGraph {
    pub fn knowledge_nodes(&self) -> impl Iterator<Item = &CompanyNode> {
        self.nodes
            .iter()
            .filter(|n| n.kind == CompanyNodeKind::Knowledge)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// User question graph: questions → keywords → categories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGraph {
    pub questions: Vec<UserQuestionNode>,
    /// Running keyword totals across all events, never decremented.
    pub keyword_counts: BTreeMap<String, u32>,
    /// Running category totals across all events, never decremented.
    pub category_counts: BTreeMap<String, u32>,
    pub edges: Vec<GraphEdge>,
    /// Mean of reported satisfaction scores, if any events carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_satisfaction: Option<f64>,
}

impl UserGraph {
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Best company match for one user question; produced per merge run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityMatch {
    pub user_id: String,
    pub company_id: String,
    /// Always within `[threshold, 1]`.
    pub similarity: f64,
}

/// Which graphs contributed a merged node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeSource {
    User,
    Company,
    Both,
}

/// Kind-specific payload of a merged node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "detailKind", rename_all = "lowercase")]
pub enum MergedDetail {
    Company(CompanyNode),
    Question(UserQuestionNode),
}

/// A node in the merged graph. `both` nodes are synthesized during the
/// merge, never stored independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedNode {
    pub id: String,
    pub label: String,
    pub source: MergeSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_id: Option<String>,
    pub detail: MergedDetail,
}

/// Headline numbers for one merge run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapAnalysis {
    pub total_nodes: usize,
    pub user_only: usize,
    pub company_only: usize,
    pub overlap: usize,
    /// `round(overlap / total user questions * 100)`, 0 with no questions.
    pub coverage_rate: u32,
}

impl OverlapAnalysis {
    /// Coverage as a whole percentage; defined as 0 when there are no user
    /// questions rather than NaN.
    pub fn coverage_rate(overlap: usize, total_user: usize) -> u32 {
        if total_user == 0 {
            return 0;
        }
        (overlap as f64 / total_user as f64 * 100.0).round() as u32
    }
}

/// The merge output contract consumed by visualization and analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedGraph {
    pub nodes: Vec<MergedNode>,
    pub links: Vec<GraphEdge>,
    pub overlap_analysis: OverlapAnalysis,
}

impl MergedGraph {
    /// Undirected neighbor listing used by consumers that need topology
    /// without caring about edge direction.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }
}
