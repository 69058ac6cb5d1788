//! Analysis run routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::error;

use covergraph_ingest::{ProductRecord, QuestionEvent};
use covergraph_runtime::AnalysisRun;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/analyze", post(run_analysis))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub questions: Vec<QuestionEvent>,
}

/// POST /api/analyze — rebuild both graphs, merge, analyze, record trend.
async fn run_analysis(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisRun>, (StatusCode, Json<serde_json::Value>)> {
    match state
        .orchestrator
        .analyze(&request.products, &request.questions)
        .await
    {
        Ok(run) => Ok(Json(run)),
        Err(e) => {
            error!("Analysis run failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            ))
        }
    }
}
