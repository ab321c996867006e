use core::fmt;
use core::str::FromStr;
use std::path::PathBuf;

pub const BACKEND_VAR: &str = "BOOKSHELF_BACKEND";
pub const LIBRARY_PATH_VAR: &str = "BOOKSHELF_LIBRARY_PATH";
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

pub const DEFAULT_SQLITE_PATH: &str = "library.db";
pub const DEFAULT_JSON_PATH: &str = "bookshelf-store.json";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Which `KeyValueStore` holds the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BackendKind {
    #[default]
    Sqlite,
    Json,
    Memory,
}

impl BackendKind {
    const fn default_path(self) -> Option<&'static str> {
        match self {
            Self::Sqlite => Some(DEFAULT_SQLITE_PATH),
            Self::Json => Some(DEFAULT_JSON_PATH),
            Self::Memory => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::Sqlite => "sqlite",
            Self::Json => "json",
            Self::Memory => "memory",
        })
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "json" => Ok(Self::Json),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::UnknownBackend(value.to_owned())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown backend {0:?}, expected one of sqlite, json, memory")]
    UnknownBackend(String),
}

/// Settings resolved from the environment (and `.env`), then overridden by command line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: BackendKind,
    /// Backing file; `None` only for the memory backend.
    pub library_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Config {
    /// # Errors
    /// Fails if `BOOKSHELF_BACKEND` names an unknown backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        // non UTF-8 variables cannot be ours
        Self::from_vars(std::env::vars_os().filter_map(|(name, value)| {
            Some((name.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    /// Builds a config from `(name, value)` pairs. Unrelated variables are ignored.
    /// # Errors
    /// Fails if `BOOKSHELF_BACKEND` names an unknown backend.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut backend = None;
        let mut library_path = None;
        let mut log_filter = None;
        for (name, value) in vars {
            if value.trim().is_empty() {
                continue;
            }
            match name.as_str() {
                BACKEND_VAR => backend = Some(value.parse()?),
                LIBRARY_PATH_VAR => library_path = Some(PathBuf::from(value)),
                LOG_FILTER_VAR => log_filter = Some(value),
                _ => {}
            }
        }

        let backend = backend.unwrap_or_default();
        Ok(Self {
            backend,
            library_path: library_path.or_else(|| backend.default_path().map(PathBuf::from)),
            log_filter: log_filter.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
        })
    }

    /// Applies the `--backend` and `--library` flags. Switching backend without naming a file
    /// moves to that backend's default file.
    #[must_use]
    pub fn with_overrides(self, backend: Option<BackendKind>, library: Option<PathBuf>) -> Self {
        let switched = backend.filter(|&kind| kind != self.backend);
        let backend = backend.unwrap_or(self.backend);
        let library_path = match (library, switched) {
            (Some(path), _) => Some(path),
            (None, Some(kind)) => kind.default_path().map(PathBuf::from),
            (None, None) => self.library_path,
        };
        Self {
            backend,
            library_path,
            log_filter: self.log_filter,
        }
    }
}
