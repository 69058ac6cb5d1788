//! CoverGraph Core — shared graph types, configuration, error taxonomy.

pub mod config;
pub mod error;
pub mod types;

pub use config::{CoverGraphConfig, EmbeddingConfig};
pub use error::{Error, Result};
pub use types::*;
