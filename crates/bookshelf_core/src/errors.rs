//! Error types of the store and its backends

/// Failure of the medium behind a `KeyValueStore`.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("failed to migrate database: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// The JSON file backing a `JsonFileStore` is not a string-to-string object.
    #[error("malformed store file: {0}")]
    Json(#[from] serde_json::Error),
}

/// A stored value that could be read but not understood.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("not a book collection: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("collection version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("not a book id: {0:?}")]
    NotAnId(String),
}

/// Error surfaced by the fallible `try_*` operations of `Library`.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read `{key}`: {source}")]
    Read { key: &'static str, source: BackendError },

    #[error("failed to write `{key}`: {source}")]
    Write { key: &'static str, source: BackendError },

    #[error("failed to decode `{key}`: {source}")]
    Decode { key: &'static str, source: DecodeError },

    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },

    /// A stored book already uses the largest possible id.
    #[error("no unused book id left")]
    IdsExhausted,
}
