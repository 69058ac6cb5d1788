//! Configuration loaded from the environment with sensible defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedding provider settings.
///
/// When `endpoint` is unset the deterministic offline embedder is used, so
/// every component works without network access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embeddings endpoint (e.g. `https://api.example.com/v1/embeddings`).
    pub endpoint: Option<String>,
    /// Model identifier sent in the request body.
    pub model: String,
    /// Bearer token, if the endpoint requires one.
    pub api_key: Option<String>,
    /// Vector dimensionality, fixed per deployment.
    pub dimension: usize,
    /// Per-call timeout in seconds; a timeout triggers the fallback vector.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "text-embedding-v3".to_string(),
            api_key: None,
            dimension: 768,
            timeout_secs: 5,
        }
    }
}

/// Top-level CoverGraph configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverGraphConfig {
    /// HTTP server port.
    pub port: u16,
    /// Cosine similarity threshold for a question to count as covered.
    pub similarity_threshold: f64,
    /// How many coverage snapshots the trend tracker retains.
    pub trend_retention: usize,
    /// Embedding provider settings.
    pub embedding: EmbeddingConfig,
}

impl Default for CoverGraphConfig {
    fn default() -> Self {
        Self {
            port: 3017,
            similarity_threshold: 0.8,
            trend_retention: 100,
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl CoverGraphConfig {
    /// Create configuration from environment variables and defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let similarity_threshold = std::env::var("COVERGRAPH_THRESHOLD")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(defaults.similarity_threshold);

        let trend_retention = std::env::var("COVERGRAPH_TREND_RETENTION")
            .ok()
            .and_then(|r| r.parse().ok())
            .unwrap_or(defaults.trend_retention);

        let embedding = EmbeddingConfig {
            endpoint: std::env::var("COVERGRAPH_EMBED_URL").ok(),
            model: std::env::var("COVERGRAPH_EMBED_MODEL")
                .unwrap_or(defaults.embedding.model),
            api_key: std::env::var("COVERGRAPH_EMBED_API_KEY").ok(),
            dimension: std::env::var("COVERGRAPH_EMBED_DIM")
                .ok()
                .and_then(|d| d.parse().ok())
                .unwrap_or(defaults.embedding.dimension),
            timeout_secs: std::env::var("COVERGRAPH_EMBED_TIMEOUT")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.embedding.timeout_secs),
        };

        let config = Self {
            port,
            similarity_threshold,
            trend_retention,
            embedding,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold < 1.0) {
            return Err(Error::Config(format!(
                "similarity_threshold must be in (0, 1), got {}",
                self.similarity_threshold
            )));
        }
        if self.embedding.dimension == 0 {
            return Err(Error::Config("embedding dimension must be non-zero".into()));
        }
        if self.trend_retention == 0 {
            return Err(Error::Config("trend_retention must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let config = CoverGraphConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!(config.embedding.dimension, 768);
        assert_eq!(config.trend_retention, 100);
    }

    #[test]
    fn test_threshold_bounds() {
        let mut config = CoverGraphConfig::default();
        config.similarity_threshold = 1.0;
        assert!(config.validate().is_err());
        config.similarity_threshold = 0.0;
        assert!(config.validate().is_err());
        config.similarity_threshold = 0.5;
        assert!(config.validate().is_ok());
    }
}
