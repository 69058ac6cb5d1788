use covergraph_core::Result;
use serde_json::Value;

/// JSON key-value persistence. Values are opaque to the store; the typed
/// contracts live in [`crate::Snapshots`].
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn put(&self, key: &str, value: &Value) -> Result<()>;

    /// Returns whether the key existed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// All keys with the given prefix, sorted ascending.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
}
