use serde_json::Value;
use tracing::warn;

use covergraph_core::{MergedGraph, Result};
use covergraph_trend::TrendTracker;

use crate::kv::KvStore;

const MERGED_KEY: &str = "snapshot:merged";
const TREND_KEY: &str = "snapshot:trend";

/// Typed snapshot contracts over an untyped [`KvStore`].
///
/// Loads tolerate malformed stored values: a snapshot that no longer
/// deserializes is logged and treated as absent rather than failing the run.
pub struct Snapshots<'a> {
    store: &'a dyn KvStore,
}

impl<'a> Snapshots<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    pub fn save_merged(&self, graph: &MergedGraph) -> Result<()> {
        self.store.put(MERGED_KEY, &serde_json::to_value(graph)?)
    }

    pub fn load_merged(&self) -> Result<Option<MergedGraph>> {
        Ok(self.store.get(MERGED_KEY)?.and_then(|v| decode(MERGED_KEY, v)))
    }

    pub fn save_trend(&self, tracker: &TrendTracker) -> Result<()> {
        self.store.put(TREND_KEY, &serde_json::to_value(tracker)?)
    }

    pub fn load_trend(&self) -> Result<Option<TrendTracker>> {
        Ok(self.store.get(TREND_KEY)?.and_then(|v| decode(TREND_KEY, v)))
    }
}

fn decode<T: serde::de::DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("Discarding malformed snapshot at {}: {}", key, e);
            None
        }
    }
}
