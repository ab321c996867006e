use crate::errors::BackendError;
use crate::storage::KeyValueStore;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Volatile backend, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `entries`.
    #[must_use]
    #[allow(clippy::missing_inline_in_public_items, reason = "Test and setup helper")]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl KeyValueStore for MemoryStore {
    #[inline]
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    #[inline]
    async fn set(&self, key: &str, value: String) -> Result<(), BackendError> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    #[inline]
    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::with_entries([("books", "[]")]);

        assert_eq!(store.get("books").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get("lastBook").await.unwrap(), None);

        store.set("lastBook", "3".to_owned()).await.unwrap();
        assert_eq!(store.get("lastBook").await.unwrap().as_deref(), Some("3"));

        store.remove("lastBook").await.unwrap();
        store.remove("lastBook").await.unwrap();
        assert_eq!(store.get("lastBook").await.unwrap(), None);
    }
}
