use crate::config::{BackendKind, Config};
use anyhow::Context as _;
use bookshelf_core::errors::BackendError;
use bookshelf_core::library::Library;
use bookshelf_core::storage::{JsonFileStore, KeyValueStore, MemoryStore, SqliteStore};
use std::path::Path;

/// The backend chosen at startup.
#[derive(Debug)]
pub enum AnyStore {
    Sqlite(SqliteStore),
    Json(JsonFileStore),
    Memory(MemoryStore),
}

impl KeyValueStore for AnyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        match self {
            Self::Sqlite(store) => store.get(key).await,
            Self::Json(store) => store.get(key).await,
            Self::Memory(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), BackendError> {
        match self {
            Self::Sqlite(store) => store.set(key, value).await,
            Self::Json(store) => store.set(key, value).await,
            Self::Memory(store) => store.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        match self {
            Self::Sqlite(store) => store.remove(key).await,
            Self::Json(store) => store.remove(key).await,
            Self::Memory(store) => store.remove(key).await,
        }
    }
}

pub struct AppState {
    pub library: Library<AnyStore>,
}

impl AppState {
    /// Opens the backend named by `config`.
    /// # Errors
    /// Fails if a file backend has no path or the SQLite database cannot be opened.
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let store = match config.backend {
            BackendKind::Sqlite => {
                let path = required_path(config)?;
                let store = SqliteStore::open(path)
                    .await
                    .with_context(|| format!("Failed to open library at {}", path.display()))?;
                AnyStore::Sqlite(store)
            }
            BackendKind::Json => AnyStore::Json(JsonFileStore::new(required_path(config)?)),
            BackendKind::Memory => {
                tracing::warn!("Using the memory backend, nothing will be saved");
                AnyStore::Memory(MemoryStore::new())
            }
        };
        tracing::info!(
            backend = %config.backend,
            path = ?config.library_path,
            "library opened"
        );
        Ok(Self {
            library: Library::new(store),
        })
    }

    pub async fn close(&self) {
        if let AnyStore::Sqlite(store) = self.library.store() {
            store.close().await;
        }
    }
}

fn required_path(config: &Config) -> anyhow::Result<&Path> {
    config
        .library_path
        .as_deref()
        .with_context(|| format!("The {} backend needs a library path", config.backend))
}
