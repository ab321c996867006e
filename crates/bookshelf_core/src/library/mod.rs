//! Library store
//!
//! `Library` owns the book collection and the last-viewed pointer on top of any `KeyValueStore`.
//! The collection is read and written as a whole; every mutation is a read-modify-write cycle.
//!
//! Two flavours of every operation exist. The plain ones (`list_all`, `upsert`, `delete`, ...) log
//! storage failures and fall back to a benign default: an empty list for reads, nothing for
//! writes. The `try_*` ones return the `StoreError` instead.
pub mod codec;
pub mod ids;
pub mod types;

use crate::errors::StoreError;
use crate::library::codec::{BOOKS_KEY, LAST_BOOK_KEY};
use crate::library::ids::IdGenerator;
use crate::library::types::{BookRecord, ValidDraft};
use crate::storage::KeyValueStore;
use log::{debug, error, info};
use tokio::sync::Mutex;

pub struct Library<S> {
    store: S,
    /// Held for the whole read-modify-write cycle of a mutation, so concurrent mutations cannot
    /// overwrite each other's results.
    writer: Mutex<()>,
    ids: IdGenerator,
}

impl<S: KeyValueStore> Library<S> {
    #[must_use]
    #[inline]
    pub fn new(store: S) -> Self {
        Self {
            store,
            writer: Mutex::new(()),
            ids: IdGenerator::new(),
        }
    }

    #[must_use]
    #[inline]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// All stored books in stored order, or an empty list if nothing is stored or the collection
    /// cannot be read.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn list_all(&self) -> Vec<BookRecord> {
        match self.try_list_all().await {
            Ok(books) => books,
            Err(err) => {
                error!("Failed to load books: {err}");
                Vec::new()
            }
        }
    }

    /// # Errors
    /// Fails if the backend cannot be read or holds something that is not a book collection.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn try_list_all(&self) -> Result<Vec<BookRecord>, StoreError> {
        let raw = self
            .store
            .get(BOOKS_KEY)
            .await
            .map_err(|source| StoreError::Read {
                key: BOOKS_KEY,
                source,
            })?;
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        codec::decode_books(&raw).map_err(|source| StoreError::Decode {
            key: BOOKS_KEY,
            source,
        })
    }

    /// Looks `id` up in `list_all`.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn get(&self, id: i64) -> Option<BookRecord> {
        self.list_all().await.into_iter().find(|book| book.id == id)
    }

    /// Replaces title, author and status of the stored book with `book.id`, or appends `book` if
    /// there is none. Failures are logged and otherwise ignored.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn upsert(&self, book: BookRecord) {
        if let Err(err) = self.try_upsert(book).await {
            error!("Failed to save book: {err}");
        }
    }

    /// # Errors
    /// Fails if the collection cannot be read or written. Nothing is written if the read fails,
    /// so an unreadable collection is never replaced.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn try_upsert(&self, book: BookRecord) -> Result<(), StoreError> {
        self.modify(move |books| {
            if let Some(existing) = books.iter_mut().find(|current| current.id == book.id) {
                debug!("Updating book {}", book.id);
                existing.replace_fields(book);
            } else {
                debug!("Inserting book {}", book.id);
                books.push(book);
            }
        })
        .await
    }

    /// Removes the book with `id`; does nothing if there is none. Failures are logged and
    /// otherwise ignored. The last-viewed pointer is left alone even if it names `id`.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn delete(&self, id: i64) {
        if let Err(err) = self.try_delete(id).await {
            error!("Failed to delete book {id}: {err}");
        }
    }

    /// Returns whether a book was removed.
    /// # Errors
    /// Fails if the collection cannot be read or written.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn try_delete(&self, id: i64) -> Result<bool, StoreError> {
        let removed = self
            .modify(|books| {
                let before = books.len();
                books.retain(|book| book.id != id);
                books.len() != before
            })
            .await?;
        if !removed {
            debug!("No book {id} to delete");
        }
        Ok(removed)
    }

    /// Stores a new book built from `draft` under a freshly generated id that no stored book
    /// uses yet.
    /// # Errors
    /// Fails if the collection cannot be read or written, or with `StoreError::IdsExhausted` if
    /// no id above the stored ones is left.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn create(&self, draft: ValidDraft) -> Result<BookRecord, StoreError> {
        let ids = &self.ids;
        self.modify(move |books| {
            let Some(id) = books
                .iter()
                .try_fold(0_i64, |floor, book| Some(floor.max(book.id.checked_add(1)?)))
                .and_then(|floor| ids.next_id(floor))
            else {
                return Err(StoreError::IdsExhausted);
            };
            let book = BookRecord::from_draft(id, draft);
            info!("Adding book {} ({})", book.id, book.title);
            books.push(book.clone());
            Ok(book)
        })
        .await?
    }

    /// Replaces the fields of the stored book with `id`. Returns `None` if there is none.
    /// # Errors
    /// Fails if the collection cannot be read or written.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn update(
        &self,
        id: i64,
        draft: ValidDraft,
    ) -> Result<Option<BookRecord>, StoreError> {
        self.modify(move |books| {
            let existing = books.iter_mut().find(|book| book.id == id)?;
            existing.replace_fields(BookRecord::from_draft(id, draft));
            Some(existing.clone())
        })
        .await
    }

    /// Records `id` as the most recently viewed book. Failures are logged and otherwise ignored.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn set_last_viewed(&self, id: i64) {
        if let Err(err) = self.try_set_last_viewed(id).await {
            error!("Failed to remember last viewed book {id}: {err}");
        }
    }

    /// # Errors
    /// Fails if the backend cannot be written.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn try_set_last_viewed(&self, id: i64) -> Result<(), StoreError> {
        self.store
            .set(LAST_BOOK_KEY, codec::encode_last_book(id))
            .await
            .map_err(|source| StoreError::Write {
                key: LAST_BOOK_KEY,
                source,
            })
    }

    /// The raw pointer. It may name a book that has since been deleted.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn last_viewed(&self) -> Option<i64> {
        match self.try_last_viewed().await {
            Ok(id) => id,
            Err(err) => {
                error!("Failed to load last viewed book: {err}");
                None
            }
        }
    }

    /// # Errors
    /// Fails if the backend cannot be read or the stored pointer is not an id.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called rarely")]
    pub async fn try_last_viewed(&self) -> Result<Option<i64>, StoreError> {
        let raw = self
            .store
            .get(LAST_BOOK_KEY)
            .await
            .map_err(|source| StoreError::Read {
                key: LAST_BOOK_KEY,
                source,
            })?;
        raw.map(|raw| codec::decode_last_book(&raw))
            .transpose()
            .map_err(|source| StoreError::Decode {
                key: LAST_BOOK_KEY,
                source,
            })
    }

    /// Resolves the pointer against `list_all`. A pointer to a deleted book yields `None`.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called once at start of program")]
    pub async fn last_viewed_book(&self) -> Option<BookRecord> {
        let id = self.last_viewed().await?;
        let book = self.get(id).await;
        if book.is_none() {
            info!("Last viewed book {id} no longer exists");
        }
        book
    }

    /// Runs `apply` on the current collection while holding the writer lock and persists the
    /// result unless `apply` left the collection as it was.
    async fn modify<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Vec<BookRecord>) -> T + Send,
    {
        let _writer = self.writer.lock().await;
        let before = self.try_list_all().await?;
        let mut books = before.clone();
        let outcome = apply(&mut books);
        if books != before {
            self.persist(&books).await?;
        }
        Ok(outcome)
    }

    async fn persist(&self, books: &[BookRecord]) -> Result<(), StoreError> {
        let encoded = codec::encode_books(books).map_err(|source| StoreError::Encode {
            key: BOOKS_KEY,
            source,
        })?;
        self.store
            .set(BOOKS_KEY, encoded)
            .await
            .map_err(|source| StoreError::Write {
                key: BOOKS_KEY,
                source,
            })?;
        debug!("Persisted {} books", books.len());
        Ok(())
    }
}
