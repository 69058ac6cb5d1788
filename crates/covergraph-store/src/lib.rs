//! Persistence layer: a small key-value abstraction with in-memory and
//! SQLite backends, plus typed snapshot helpers on top of it.

mod kv;
mod memory;
mod snapshot;
mod sqlite;

pub use kv::KvStore;
pub use memory::MemoryStore;
pub use snapshot::Snapshots;
pub use sqlite::SqliteStore;
