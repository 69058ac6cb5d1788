//! Merge & overlap engine: one unified graph out of two heterogeneous ones,
//! with provable coverage numbers attached.

pub mod engine;

pub use engine::MergeEngine;
