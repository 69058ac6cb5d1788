//! Embedding subsystem: text → fixed-length vectors, plus the similarity
//! index the merge engine queries.

pub mod index;
pub mod provider;

pub use index::{cosine_similarity, SimilarityHit, VectorIndex, VectorRecord};
pub use provider::{
    create_backend, l2_normalize, pseudo_embedding, EmbeddingBackend, HttpEmbedder,
    PseudoEmbedder,
};
