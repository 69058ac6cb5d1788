//! CoverGraph — knowledge-base coverage analysis server.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> std::path::PathBuf {
    std::env::var("COVERGRAPH_DATA_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = covergraph_core::CoverGraphConfig::from_env()?;
    let port = config.port;

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let store = covergraph_store::SqliteStore::open(&data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;

    let backend = covergraph_embed::create_backend(&config.embedding);

    let state = Arc::new(AppState::new(config, store, backend)?);

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("CoverGraph server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
