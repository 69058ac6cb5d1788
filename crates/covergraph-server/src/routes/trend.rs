//! Coverage trend routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/trend", get(get_trend))
}

/// GET /api/trend — coverage history and direction over the recent window.
async fn get_trend(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let trend = state.orchestrator.trend();
    let history = state.orchestrator.history();
    Json(serde_json::json!({
        "trend": trend,
        "history": history,
    }))
}
