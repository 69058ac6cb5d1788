//! Shared application state.

use std::sync::Arc;

use covergraph_core::{CoverGraphConfig, Result};
use covergraph_embed::EmbeddingBackend;
use covergraph_runtime::Orchestrator;
use covergraph_store::{KvStore, SqliteStore};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: CoverGraphConfig,
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(
        config: CoverGraphConfig,
        store: SqliteStore,
        backend: Arc<dyn EmbeddingBackend>,
    ) -> Result<Self> {
        let store: Arc<dyn KvStore> = Arc::new(store);
        let orchestrator = Orchestrator::new(config.clone(), backend, store)?;
        Ok(Self {
            config,
            orchestrator,
        })
    }
}
