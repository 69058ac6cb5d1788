//! Status and server info routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(get_status))
}

/// GET /api/status — server configuration and latest run summary.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let latest = state.orchestrator.latest_merged().unwrap_or_default();
    let overlap = latest.as_ref().map(|g| g.overlap_analysis);

    Json(serde_json::json!({
        "port": state.config.port,
        "similarityThreshold": state.config.similarity_threshold,
        "trendRetention": state.config.trend_retention,
        "embeddingModel": state.config.embedding.model,
        "embeddingDimension": state.config.embedding.dimension,
        "offlineEmbedder": state.config.embedding.endpoint.is_none(),
        "hasSnapshot": latest.is_some(),
        "latestOverlap": overlap,
        "coveragePoints": state.orchestrator.history().len(),
    }))
}
