//! Embedding backends.
//!
//! The `EmbeddingBackend` trait abstracts over embedding generation.
//! Implementations:
//! - `HttpEmbedder`: remote provider speaking the `{model, input, dimensions}`
//!   request shape; every failure falls back to the deterministic vector.
//! - `PseudoEmbedder`: offline, reproducible hash-derived vectors.
//!
//! The contract is infallible on purpose: a provider outage degrades match
//! quality, it never fails a run.

use std::time::Duration;

use async_trait::async_trait;
use ndarray::ArrayView1;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use covergraph_core::{EmbeddingConfig, Error, Result};

/// Trait for embedding backends.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate an L2-normalized embedding for a text string.
    async fn embed(&self, text: &str) -> Vec<f32>;

    /// Generate embeddings for a batch of texts, preserving input order.
    async fn embed_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await);
        }
        out
    }

    /// The fixed vector dimensionality.
    fn dimension(&self) -> usize;
}

/// Scale a vector to unit length in place. Zero vectors are left unchanged.
pub fn l2_normalize(vector: &mut [f32]) {
    let view = ArrayView1::from(&*vector);
    let norm = view.dot(&view).sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Deterministic pseudo-embedding: sha256 of the text seeds a fixed periodic
/// expansion, so identical input always yields the identical vector. This is
/// what makes offline tests and provider outages reproducible.
pub fn pseudo_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let digest = Sha256::digest(text.as_bytes());
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    let seed = u64::from_le_bytes(seed_bytes);

    // Keep the seed small so sin() stays well away from precision loss.
    let base = (seed % 1_000_000) as f64 / 1000.0;
    let mut vector: Vec<f32> = (0..dimension)
        .map(|i| (base * (i + 1) as f64).sin() as f32)
        .collect();
    l2_normalize(&mut vector);
    vector
}

/// Offline embedder backed by the deterministic pseudo-embedding.
pub struct PseudoEmbedder {
    dimension: usize,
}

impl PseudoEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingBackend for PseudoEmbedder {
    async fn embed(&self, text: &str) -> Vec<f32> {
        pseudo_embedding(text, self.dimension)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

/// Remote embedding provider with the deterministic fallback baked in.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dimension: usize,
}

impl HttpEmbedder {
    /// Create a client for the configured endpoint.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| Error::Config("HttpEmbedder requires an endpoint".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            dimension: config.dimension,
        })
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let mut request = self.client.post(&self.endpoint).json(&EmbedRequest {
            model: &self.model,
            input: [text],
            dimensions: self.dimension,
        });
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let resp = request
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::Http(format!(
                "provider returned status {}",
                resp.status()
            )));
        }

        let body: EmbedResponse = resp.json().await.map_err(|e| Error::Http(e.to_string()))?;
        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Http("provider returned no embeddings".to_string()))?;

        if embedding.len() != self.dimension {
            return Err(Error::Http(format!(
                "provider returned dimension {}, expected {}",
                embedding.len(),
                self.dimension
            )));
        }

        Ok(embedding)
    }
}

#[async_trait]
impl EmbeddingBackend for HttpEmbedder {
    async fn embed(&self, text: &str) -> Vec<f32> {
        match self.request_embedding(text).await {
            Ok(mut vector) => {
                l2_normalize(&mut vector);
                vector
            }
            Err(e) => {
                warn!("Embedding provider unavailable, using deterministic fallback: {}", e);
                pseudo_embedding(text, self.dimension)
            }
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Create the best available backend for the configuration: HTTP when an
/// endpoint is configured, otherwise the offline pseudo-embedder.
pub fn create_backend(config: &EmbeddingConfig) -> std::sync::Arc<dyn EmbeddingBackend> {
    if config.endpoint.is_some() {
        match HttpEmbedder::new(config) {
            Ok(embedder) => {
                info!("Using HTTP embedding provider (model: {})", config.model);
                return std::sync::Arc::new(embedder);
            }
            Err(e) => {
                warn!("Failed to initialize HTTP embedder: {}; running offline", e);
            }
        }
    }
    info!("Using deterministic offline embedder (dim: {})", config.dimension);
    std::sync::Arc::new(PseudoEmbedder::new(config.dimension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pseudo_embedding_deterministic() {
        let a = pseudo_embedding("怎么安装", 64);
        let b = pseudo_embedding("怎么安装", 64);
        assert_eq!(a, b);
    }

    #[test]
    fn test_pseudo_embedding_distinct_inputs() {
        let a = pseudo_embedding("how do I install this", 64);
        let b = pseudo_embedding("how do I cancel my plan", 64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_pseudo_embedding_normalized() {
        let v = pseudo_embedding("some text", 128);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {}", norm);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = vec![0.0_f32; 8];
        l2_normalize(&mut v);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_pseudo_embedder_backend() {
        let backend = PseudoEmbedder::new(32);
        assert_eq!(backend.dimension(), 32);
        let v = backend.embed("hello").await;
        assert_eq!(v.len(), 32);

        let batch = backend.embed_batch(&["a", "b", "a"]).await;
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0], batch[2]);
    }

    #[tokio::test]
    async fn test_http_embedder_falls_back_offline() {
        // Unroutable endpoint: every call must recover via the fallback.
        let config = EmbeddingConfig {
            endpoint: Some("http://127.0.0.1:1/v1/embeddings".to_string()),
            timeout_secs: 1,
            dimension: 16,
            ..Default::default()
        };
        let embedder = HttpEmbedder::new(&config).unwrap();
        let v = embedder.embed("offline text").await;
        assert_eq!(v, pseudo_embedding("offline text", 16));
    }

    #[test]
    fn test_http_embedder_requires_endpoint() {
        let config = EmbeddingConfig::default();
        assert!(HttpEmbedder::new(&config).is_err());
    }
}
