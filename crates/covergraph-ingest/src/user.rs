//! User question graph builder: questions → keywords → categories.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use covergraph_core::{rel, GraphEdge, Sentiment, UserGraph, UserQuestionNode};

/// One question event from the interaction-logging layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEvent {
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction: Option<f64>,
    /// When the question was asked; defaults to build time when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asked_at: Option<DateTime<Utc>>,
}

/// Minimum shared keywords for two questions to count as related.
const RELATED_MIN_SHARED: usize = 2;
/// At most this many related questions are kept per node.
const RELATED_MAX: usize = 5;

/// Stable question identity: identical content collapses into one node
/// across events and across runs.
pub fn question_id(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("q-{}", &hex::encode(digest)[..12])
}

/// Builds an immutable `UserGraph` from an ordered snapshot of events.
pub struct UserGraphBuilder;

impl UserGraphBuilder {
    /// Process events in order: first occurrence creates a node, repeats
    /// increment frequency and refresh `last_asked`. Keyword and category
    /// counters only ever grow.
    pub fn build(events: &[QuestionEvent]) -> UserGraph {
        let mut questions: Vec<UserQuestionNode> = Vec::new();
        let mut position: HashMap<String, usize> = HashMap::new();
        let mut keyword_counts: BTreeMap<String, u32> = BTreeMap::new();
        let mut category_counts: BTreeMap<String, u32> = BTreeMap::new();
        // (keyword, category) co-occurrence, for keyword → category edges.
        let mut keyword_category: BTreeMap<(String, String), u32> = BTreeMap::new();
        let mut satisfaction_sum = 0.0;
        let mut satisfaction_count = 0_u32;

        for event in events {
            let id = question_id(&event.content);
            let asked_at = event.asked_at.unwrap_or_else(Utc::now);
            let keywords: Vec<String> =
                event.keywords.iter().map(|k| k.to_lowercase()).collect();

            let affected = match position.get(&id) {
                Some(&pos) => {
                    questions[pos].frequency += 1;
                    questions[pos].last_asked = asked_at;
                    pos
                }
                None => {
                    let pos = questions.len();
                    questions.push(UserQuestionNode {
                        id: id.clone(),
                        content: event.content.clone(),
                        keywords: keywords.clone(),
                        frequency: 1,
                        category: event.category.clone(),
                        sentiment: event.sentiment,
                        last_asked: asked_at,
                        related_ids: Vec::new(),
                    });
                    position.insert(id, pos);
                    pos
                }
            };

            for keyword in &keywords {
                *keyword_counts.entry(keyword.clone()).or_insert(0) += 1;
                *keyword_category
                    .entry((keyword.clone(), event.category.clone()))
                    .or_insert(0) += 1;
            }
            *category_counts.entry(event.category.clone()).or_insert(0) += 1;
            if let Some(score) = event.satisfaction {
                satisfaction_sum += score;
                satisfaction_count += 1;
            }

            Self::recompute_related(&mut questions, affected);
        }

        let edges = Self::build_edges(&questions, &keyword_category);

        debug!(
            "User graph built: {} events, {} questions, {} edges",
            events.len(),
            questions.len(),
            edges.len()
        );

        UserGraph {
            questions,
            keyword_counts,
            category_counts,
            edges,
            avg_satisfaction: (satisfaction_count > 0)
                .then(|| satisfaction_sum / satisfaction_count as f64),
        }
    }

    /// Recompute `related_ids` for the node touched by the latest event:
    /// every other question sharing at least two keywords, keeping the five
    /// highest overlaps (ties resolved by creation order).
    fn recompute_related(questions: &mut [UserQuestionNode], affected: usize) {
        let own: HashSet<&str> = questions[affected]
            .keywords
            .iter()
            .map(String::as_str)
            .collect();

        let mut candidates: Vec<(usize, usize)> = questions
            .iter()
            .enumerate()
            .filter(|(pos, _)| *pos != affected)
            .filter_map(|(pos, other)| {
                let shared = other
                    .keywords
                    .iter()
                    .filter(|k| own.contains(k.as_str()))
                    .count();
                (shared >= RELATED_MIN_SHARED).then_some((shared, pos))
            })
            .collect();

        // Highest overlap first; equal overlaps keep creation order.
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        candidates.truncate(RELATED_MAX);

        let related: Vec<String> = candidates
            .into_iter()
            .map(|(_, pos)| questions[pos].id.clone())
            .collect();
        questions[affected].related_ids = related;
    }

    fn build_edges(
        questions: &[UserQuestionNode],
        keyword_category: &BTreeMap<(String, String), u32>,
    ) -> Vec<GraphEdge> {
        let mut edges = Vec::new();

        for question in questions {
            for keyword in &question.keywords {
                edges.push(GraphEdge::new(
                    &question.id,
                    format!("kw-{}", keyword),
                    rel::ASKS_ABOUT,
                    1.0,
                ));
            }
        }

        for ((keyword, category), count) in keyword_category {
            edges.push(GraphEdge::new(
                format!("kw-{}", keyword),
                format!("uc-{}", category),
                rel::BELONGS_TO,
                *count as f64,
            ));
        }

        // Related pairs, emitted once per pair.
        let mut seen: HashSet<(String, String)> = HashSet::new();
        for question in questions {
            for related in &question.related_ids {
                let key = if question.id < *related {
                    (question.id.clone(), related.clone())
                } else {
                    (related.clone(), question.id.clone())
                };
                if seen.insert(key.clone()) {
                    edges.push(GraphEdge::new(key.0, key.1, rel::RELATED, 1.0));
                }
            }
        }

        edges
    }
}
