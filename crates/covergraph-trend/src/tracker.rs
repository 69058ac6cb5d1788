use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use covergraph_core::OverlapAnalysis;

/// Oldest records beyond this count are evicted.
pub const DEFAULT_RETENTION: usize = 100;

/// Trend computation looks at the most recent records only.
pub const TREND_WINDOW: usize = 5;

/// Change rates larger than this (in either direction) leave "stable".
const DIRECTION_THRESHOLD: f64 = 5.0;
/// Change rates larger than this are worth surfacing on their own.
const SIGNIFICANT_THRESHOLD: f64 = 10.0;

/// One coverage measurement, captured after a merge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesRecord {
    pub timestamp: DateTime<Utc>,
    pub coverage_rate: u32,
    pub total_user_nodes: usize,
    pub covered_nodes: usize,
    pub uncovered_nodes: usize,
    pub threshold_used: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Direction and magnitude of coverage movement over the recent window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageTrend {
    pub direction: TrendDirection,
    /// Percent change from the first to the last record in the window;
    /// 0 when the window holds fewer than two records or starts at zero.
    pub change_rate: f64,
    pub significant: bool,
    pub records_considered: usize,
}

/// Bounded history of coverage measurements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendTracker {
    records: VecDeque<TimeSeriesRecord>,
    retention: usize,
}

impl Default for TrendTracker {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl TrendTracker {
    pub fn new(retention: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(retention.min(DEFAULT_RETENTION)),
            retention: retention.max(1),
        }
    }

    /// Append a measurement derived from one merge run, evicting the oldest
    /// record once retention is exceeded.
    pub fn add_record(&mut self, analysis: &OverlapAnalysis, threshold: f64) -> &TimeSeriesRecord {
        let record = TimeSeriesRecord {
            timestamp: Utc::now(),
            coverage_rate: analysis.coverage_rate,
            total_user_nodes: analysis.overlap + analysis.user_only,
            covered_nodes: analysis.overlap,
            uncovered_nodes: analysis.user_only,
            threshold_used: threshold,
        };
        self.push(record)
    }

    /// Append an already-built record; used when replaying persisted history.
    pub fn push(&mut self, record: TimeSeriesRecord) -> &TimeSeriesRecord {
        while self.records.len() >= self.retention {
            self.records.pop_front();
        }
        self.records.push_back(record);
        debug!(
            "Recorded coverage point ({} of {} retained)",
            self.records.len(),
            self.retention
        );
        // Non-empty: a record was just pushed.
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> impl Iterator<Item = &TimeSeriesRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&TimeSeriesRecord> {
        self.records.back()
    }

    /// Coverage movement over the last [`TREND_WINDOW`] records, comparing
    /// the earliest and latest in that window.
    pub fn trend(&self) -> CoverageTrend {
        let window_start = self.records.len().saturating_sub(TREND_WINDOW);
        let window: Vec<&TimeSeriesRecord> = self.records.iter().skip(window_start).collect();

        if window.len() < 2 {
            return CoverageTrend {
                direction: TrendDirection::Stable,
                change_rate: 0.0,
                significant: false,
                records_considered: window.len(),
            };
        }

        let first = window[0].coverage_rate as f64;
        let last = window[window.len() - 1].coverage_rate as f64;
        let change_rate = if first == 0.0 {
            0.0
        } else {
            (last - first) / first * 100.0
        };

        let direction = if change_rate > DIRECTION_THRESHOLD {
            TrendDirection::Increasing
        } else if change_rate < -DIRECTION_THRESHOLD {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };

        CoverageTrend {
            direction,
            change_rate,
            significant: change_rate.abs() > SIGNIFICANT_THRESHOLD,
            records_considered: window.len(),
        }
    }
}
