use crate::errors::BackendError;
use crate::storage::KeyValueStore;
use log::debug;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

type Entries = BTreeMap<String, String>;

/// Backend keeping the whole namespace in one JSON object file, e.g.
/// `{"books": "...", "lastBook": "12"}`.
///
/// The file is read on first access and cached. Every write serializes the full namespace to a
/// sibling `.tmp` file and renames it over the original, so a crash mid-write leaves the previous
/// contents intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Option<Entries>>,
}

impl JsonFileStore {
    /// Does not touch the file system; the file is read lazily and created on first write.
    #[must_use]
    #[inline]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    #[must_use]
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Entries, BackendError> {
        match fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(Entries::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No store file at {}, starting empty", self.path.display());
                Ok(Entries::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn persist(&self, entries: &Entries) -> Result<(), BackendError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(entries)?).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!("Wrote {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// Applies `change` to a copy of the namespace, writes it out and only then replaces the
    /// cached copy.
    async fn update<F>(&self, change: F) -> Result<(), BackendError>
    where
        F: FnOnce(&mut Entries) + Send,
    {
        let mut guard = self.entries.lock().await;
        let mut next = match guard.as_ref() {
            Some(cached) => cached.clone(),
            None => self.load().await?,
        };
        change(&mut next);
        self.persist(&next).await?;
        *guard = Some(next);
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    #[inline]
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        Ok(guard.as_ref().and_then(|entries| entries.get(key).cloned()))
    }

    #[inline]
    async fn set(&self, key: &str, value: String) -> Result<(), BackendError> {
        let key = key.to_owned();
        self.update(move |entries| {
            entries.insert(key, value);
        })
        .await
    }

    #[inline]
    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.update(|entries| {
            entries.remove(key);
        })
        .await
    }
}
