//! Pipeline orchestration: one entry point that rebuilds both graphs,
//! merges them, analyzes the result, and records the coverage point.

mod orchestrator;

pub use orchestrator::{AnalysisRun, Orchestrator};
