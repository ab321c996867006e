use crate::errors::BackendError;
use crate::storage::KeyValueStore;
use core::str::FromStr as _;
use log::info;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;

/// Backend storing every key as a row of the `kv` table of a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and brings its schema up to date.
    /// # Errors
    /// Fails if the file cannot be opened or the migrations cannot be applied.
    #[allow(
        clippy::missing_inline_in_public_items,
        reason = "Called once at start of program"
    )]
    pub async fn open(path: &Path) -> Result<Self, BackendError> {
        info!("Opening SQLite store at {}", path.display());
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// Opens a private in-memory database. Everything is lost once the store is dropped.
    /// # Errors
    /// Fails if the migrations cannot be applied.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn in_memory() -> Result<Self, BackendError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // every connection to :memory: is its own database, so keep exactly one alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, BackendError> {
        sqlx::migrate!().run(&pool).await?;
        Ok(Self { pool })
    }

    #[allow(
        clippy::missing_inline_in_public_items,
        reason = "Called once at end of program"
    )]
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl KeyValueStore for SqliteStore {
    #[inline]
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    #[inline]
    async fn set(&self, key: &str, value: String) -> Result<(), BackendError> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value;
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[inline]
    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let store = SqliteStore::in_memory().await.unwrap();

        assert_eq!(store.get("books").await.unwrap(), None);
        store.set("books", "[]".to_owned()).await.unwrap();
        store.set("books", "[1]".to_owned()).await.unwrap();
        assert_eq!(store.get("books").await.unwrap().as_deref(), Some("[1]"));

        store.remove("books").await.unwrap();
        assert_eq!(store.get("books").await.unwrap(), None);
        store.close().await;
    }

    #[tokio::test]
    async fn test_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.db");

        let store = SqliteStore::open(&path).await.unwrap();
        store.set("lastBook", "17".to_owned()).await.unwrap();
        store.close().await;

        let reopened = SqliteStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("lastBook").await.unwrap().as_deref(),
            Some("17")
        );
        reopened.close().await;
    }
}
