//! Orchestrator — runs the whole coverage pipeline as one operation.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use covergraph_analyze::{AnalysisReport, GraphAnalysisService};
use covergraph_core::{CoverGraphConfig, MergedGraph, Result};
use covergraph_embed::EmbeddingBackend;
use covergraph_ingest::{CompanyGraphBuilder, ProductRecord, QuestionEvent, UserGraphBuilder};
use covergraph_merge::MergeEngine;
use covergraph_store::{KvStore, Snapshots};
use covergraph_trend::{CoverageTrend, TrendTracker};

/// Output of one full pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRun {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub merged: MergedGraph,
    pub report: AnalysisReport,
    pub trend: CoverageTrend,
    pub duration_ms: u64,
}

/// Coordinates graph building, merging, analysis, and trend tracking.
///
/// Each call to [`analyze`](Self::analyze) rebuilds both graphs from the
/// submitted inputs; no graph state is carried between runs. Only the
/// coverage history accumulates, bounded by the configured retention.
pub struct Orchestrator {
    backend: Arc<dyn EmbeddingBackend>,
    store: Arc<dyn KvStore>,
    config: CoverGraphConfig,
    tracker: Mutex<TrendTracker>,
}

impl Orchestrator {
    /// Restores coverage history from the store if a snapshot exists.
    pub fn new(
        config: CoverGraphConfig,
        backend: Arc<dyn EmbeddingBackend>,
        store: Arc<dyn KvStore>,
    ) -> Result<Self> {
        let tracker = Snapshots::new(store.as_ref())
            .load_trend()?
            .unwrap_or_else(|| TrendTracker::new(config.trend_retention));

        info!(
            "Orchestrator initialized: threshold={}, retention={}, {} coverage points restored",
            config.similarity_threshold,
            config.trend_retention,
            tracker.len()
        );

        Ok(Self {
            backend,
            store,
            config,
            tracker: Mutex::new(tracker),
        })
    }

    pub fn config(&self) -> &CoverGraphConfig {
        &self.config
    }

    /// Run the full pipeline: build both graphs, merge, analyze, record the
    /// coverage point, and persist the merged graph and history.
    pub async fn analyze(
        &self,
        products: &[ProductRecord],
        events: &[QuestionEvent],
    ) -> Result<AnalysisRun> {
        let start = Instant::now();
        let started_at = Utc::now();
        let id = Uuid::new_v4().to_string();

        info!(
            "Starting analysis run {}: {} products, {} question events",
            id,
            products.len(),
            events.len()
        );

        let company = CompanyGraphBuilder::build(products);
        let user = UserGraphBuilder::build(events);

        let engine = MergeEngine::new(self.backend.clone(), self.config.similarity_threshold);
        let merged = engine.merge(&company, &user).await;

        let report = GraphAnalysisService::analyze(&merged);

        let trend = {
            let mut tracker = self.tracker.lock();
            tracker.add_record(&merged.overlap_analysis, self.config.similarity_threshold);
            let trend = tracker.trend();

            let snapshots = Snapshots::new(self.store.as_ref());
            snapshots.save_merged(&merged)?;
            snapshots.save_trend(&tracker)?;
            trend
        };

        let run = AnalysisRun {
            id,
            started_at,
            merged,
            report,
            trend,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Analysis run {} complete: coverage={}%, {} blind spots, {}ms",
            run.id,
            run.merged.overlap_analysis.coverage_rate,
            run.report.blind_spots.len(),
            run.duration_ms
        );

        Ok(run)
    }

    /// Current coverage trend without running the pipeline.
    pub fn trend(&self) -> CoverageTrend {
        self.tracker.lock().trend()
    }

    /// Coverage history, oldest first.
    pub fn history(&self) -> Vec<covergraph_trend::TimeSeriesRecord> {
        self.tracker.lock().records().cloned().collect()
    }

    /// Most recently persisted merged graph, if any run has completed.
    pub fn latest_merged(&self) -> Result<Option<MergedGraph>> {
        Snapshots::new(self.store.as_ref()).load_merged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covergraph_core::EmbeddingConfig;
    use covergraph_embed::PseudoEmbedder;
    use covergraph_ingest::KnowledgeDoc;
    use covergraph_store::MemoryStore;

    fn config() -> CoverGraphConfig {
        CoverGraphConfig {
            port: 3017,
            similarity_threshold: 0.8,
            trend_retention: 100,
            embedding: EmbeddingConfig::default(),
        }
    }

    fn orchestrator(store: Arc<dyn KvStore>) -> Orchestrator {
        let backend = Arc::new(PseudoEmbedder::new(64));
        Orchestrator::new(config(), backend, store).unwrap()
    }

    fn products() -> Vec<ProductRecord> {
        vec![ProductRecord {
            id: "p1".into(),
            name: "Widget".into(),
            description: "A widget".into(),
            knowledge_base: vec![KnowledgeDoc {
                title: "install guide".into(),
                content: "how to install the widget".into(),
                tags: vec!["setup".into()],
            }],
        }]
    }

    fn events() -> Vec<QuestionEvent> {
        vec![
            // Identical to the knowledge text "install guide how to install
            // the widget setup", so it matches at similarity 1.0.
            QuestionEvent {
                content: "install guide how to install the widget setup".into(),
                keywords: vec!["install".into()],
                category: "setup".into(),
                sentiment: Default::default(),
                satisfaction: None,
                asked_at: None,
            },
            QuestionEvent {
                content: "something else entirely".into(),
                keywords: vec!["other".into()],
                category: "other".into(),
                sentiment: Default::default(),
                satisfaction: None,
                asked_at: None,
            },
        ]
    }

    #[tokio::test]
    async fn test_full_pipeline_run() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let orch = orchestrator(store);

        let run = orch.analyze(&products(), &events()).await.unwrap();

        assert!(!run.id.is_empty());
        // The verbatim question matched, so at least one overlap.
        assert!(run.merged.overlap_analysis.overlap >= 1);
        // Two questions plus company nodes (product, category, knowledge).
        assert_eq!(run.merged.nodes.len(), 2 + 3);
        assert_eq!(run.report.centralities.len(), run.merged.nodes.len());
        assert_eq!(run.trend.records_considered, 1);
    }

    #[tokio::test]
    async fn test_snapshots_persisted() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let orch = orchestrator(store.clone());

        orch.analyze(&products(), &events()).await.unwrap();

        assert!(orch.latest_merged().unwrap().is_some());
        assert_eq!(orch.history().len(), 1);
    }

    #[tokio::test]
    async fn test_history_survives_restart() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        {
            let orch = orchestrator(store.clone());
            orch.analyze(&products(), &events()).await.unwrap();
            orch.analyze(&products(), &events()).await.unwrap();
        }

        let restarted = orchestrator(store);
        assert_eq!(restarted.history().len(), 2);
        assert_eq!(restarted.trend().records_considered, 2);
    }

    #[tokio::test]
    async fn test_empty_inputs() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let orch = orchestrator(store);

        let run = orch.analyze(&[], &[]).await.unwrap();
        assert_eq!(run.merged.overlap_analysis.coverage_rate, 0);
        assert!(run.merged.nodes.is_empty());
        assert!(run.report.blind_spots.is_empty());
    }
}
