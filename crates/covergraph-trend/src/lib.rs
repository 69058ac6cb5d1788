//! Coverage time series: one record per merge run, with trend detection
//! over the recent window.

mod tracker;

pub use tracker::{
    CoverageTrend, TimeSeriesRecord, TrendDirection, TrendTracker, DEFAULT_RETENTION,
    TREND_WINDOW,
};
