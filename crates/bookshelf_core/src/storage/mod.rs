//! Key-value backends
//!
//! The store only ever needs a flat namespace of string keys mapping to string values. Anything
//! that can provide that implements `KeyValueStore` and can be handed to a `Library`.
pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::errors::BackendError;

/// A flat, persistent string namespace.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing is stored there.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, BackendError>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), BackendError>> + Send;
}
