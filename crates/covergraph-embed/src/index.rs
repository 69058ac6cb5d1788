//! Origin-tagged in-memory vector index.
//!
//! A linear scan over a few hundred to a few thousand records: exact
//! results and stable insertion-order tie breaking matter more here than
//! approximate-nearest-neighbor speed.

use std::sync::Arc;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use covergraph_core::Origin;

use crate::provider::EmbeddingBackend;

/// A stored vector. Immutable once created; owned exclusively by the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorRecord {
    pub id: u64,
    pub text: String,
    pub vector: Vec<f32>,
    pub origin: Origin,
    pub metadata: serde_json::Value,
}

/// One similarity query result.
#[derive(Debug, Clone)]
pub struct SimilarityHit {
    pub record: VectorRecord,
    pub similarity: f64,
}

/// Cosine similarity, clamped to `[0, 1]`.
///
/// Dimension mismatches and zero-magnitude vectors resolve to `0.0` rather
/// than an error: an invalid vector signals no-match, it never raises.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let av = ArrayView1::from(a);
    let bv = ArrayView1::from(b);
    let norm_a = av.dot(&av).sqrt() as f64;
    let norm_b = bv.dot(&bv).sqrt() as f64;
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let sim = av.dot(&bv) as f64 / (norm_a * norm_b);
    sim.clamp(0.0, 1.0)
}

/// In-memory vector index over an embedding backend.
pub struct VectorIndex {
    backend: Arc<dyn EmbeddingBackend>,
    records: Vec<VectorRecord>,
    next_id: u64,
}

impl VectorIndex {
    pub fn new(backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self {
            backend,
            records: Vec::new(),
            next_id: 0,
        }
    }

    /// Embed and store one text. Ids are assigned in insertion order, which
    /// is also the tie order for equal similarities.
    pub async fn add(
        &mut self,
        text: &str,
        metadata: serde_json::Value,
        origin: Origin,
    ) -> VectorRecord {
        let vector = self.backend.embed(text).await;
        let record = VectorRecord {
            id: self.next_id,
            text: text.to_string(),
            vector,
            origin,
            metadata,
        };
        self.next_id += 1;
        self.records.push(record.clone());
        record
    }

    /// Sequential embed-and-store; the returned ids preserve input order.
    pub async fn add_batch(
        &mut self,
        items: Vec<(String, serde_json::Value, Origin)>,
    ) -> Vec<u64> {
        let mut ids = Vec::with_capacity(items.len());
        for (text, metadata, origin) in items {
            let record = self.add(&text, metadata, origin).await;
            ids.push(record.id);
        }
        ids
    }

    /// Embed the query and rank all records of the requested origin by
    /// cosine similarity: keep `similarity ≥ threshold`, sort descending
    /// (stable, so ties keep insertion order), truncate to `limit`.
    pub async fn find_most_similar(
        &self,
        text: &str,
        threshold: f64,
        origin: Option<Origin>,
        limit: usize,
    ) -> Vec<SimilarityHit> {
        let query = self.backend.embed(text).await;

        let mut hits: Vec<SimilarityHit> = self
            .records
            .iter()
            .filter(|r| origin.map_or(true, |o| r.origin == o))
            .filter_map(|r| {
                let similarity = cosine_similarity(&query, &r.vector);
                (similarity >= threshold).then(|| SimilarityHit {
                    record: r.clone(),
                    similarity,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        hits
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PseudoEmbedder;
    use async_trait::async_trait;

    /// Backend that embeds per-word so overlapping-keyword texts collide.
    struct WordBagEmbedder;

    #[async_trait]
    impl EmbeddingBackend for WordBagEmbedder {
        async fn embed(&self, text: &str) -> Vec<f32> {
            let mut v = vec![0.0_f32; 16];
            for word in text.split_whitespace() {
                let h = word.bytes().fold(7_usize, |acc, b| acc * 31 + b as usize);
                v[h % 16] += 1.0;
            }
            crate::provider::l2_normalize(&mut v);
            v
        }

        fn dimension(&self) -> usize {
            16
        }
    }

    fn index() -> VectorIndex {
        VectorIndex::new(Arc::new(PseudoEmbedder::new(64)))
    }

    #[test]
    fn test_cosine_symmetric() {
        let a = vec![0.3, 0.5, 0.2];
        let b = vec![0.1, 0.9, 0.4];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_cosine_self_similarity() {
        let v = vec![0.2, -0.4, 0.7, 0.1];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let zero = vec![0.0; 4];
        let v = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_bounded() {
        // Opposed vectors clamp to 0 instead of going negative.
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!((0.0..=1.0).contains(&sim));
        assert_eq!(sim, 0.0);
    }

    #[tokio::test]
    async fn test_add_assigns_sequential_ids() {
        let mut index = index();
        let id0 = index
            .add("first", serde_json::Value::Null, Origin::Company)
            .await
            .id;
        let id1 = index
            .add("second", serde_json::Value::Null, Origin::User)
            .await
            .id;
        assert_eq!(id0, 0);
        assert_eq!(id1, 1);
        assert_eq!(index.len(), 2);
    }

    #[tokio::test]
    async fn test_add_batch_preserves_order() {
        let mut index = index();
        let ids = index
            .add_batch(vec![
                ("a".into(), serde_json::Value::Null, Origin::Company),
                ("b".into(), serde_json::Value::Null, Origin::Company),
                ("c".into(), serde_json::Value::Null, Origin::Company),
            ])
            .await;
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(index.records()[1].text, "b");
    }

    #[tokio::test]
    async fn test_find_exact_match_ranks_first() {
        let mut index = index();
        index
            .add("installation guide", serde_json::Value::Null, Origin::Company)
            .await;
        index
            .add("billing overview", serde_json::Value::Null, Origin::Company)
            .await;

        let hits = index
            .find_most_similar("installation guide", 0.5, Some(Origin::Company), 5)
            .await;
        assert!(!hits.is_empty());
        assert_eq!(hits[0].record.text, "installation guide");
        assert!((hits[0].similarity - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_find_filters_by_origin() {
        let mut index = index();
        index
            .add("same text", serde_json::Value::Null, Origin::User)
            .await;

        let hits = index
            .find_most_similar("same text", 0.9, Some(Origin::Company), 5)
            .await;
        assert!(hits.is_empty());

        let hits = index
            .find_most_similar("same text", 0.9, Some(Origin::User), 5)
            .await;
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_find_respects_threshold_and_limit() {
        let mut index = VectorIndex::new(Arc::new(WordBagEmbedder));
        for text in ["install app now", "install app later", "refund my order"] {
            index
                .add(text, serde_json::Value::Null, Origin::Company)
                .await;
        }

        // Unreachable threshold: nothing comes back.
        let hits = index
            .find_most_similar("install app now", 1.01, Some(Origin::Company), 5)
            .await;
        assert!(hits.is_empty());

        let hits = index
            .find_most_similar("install app now", 0.3, Some(Origin::Company), 1)
            .await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.text, "install app now");
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let mut index = VectorIndex::new(Arc::new(WordBagEmbedder));
        // Identical texts embed identically, so both tie at similarity 1.
        index
            .add("duplicate entry", serde_json::json!({"slot": 0}), Origin::Company)
            .await;
        index
            .add("duplicate entry", serde_json::json!({"slot": 1}), Origin::Company)
            .await;

        let hits = index
            .find_most_similar("duplicate entry", 0.5, Some(Origin::Company), 5)
            .await;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].record.metadata["slot"], 0);
        assert_eq!(hits[1].record.metadata["slot"], 1);
    }
}
