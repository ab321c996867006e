//! One function per screen of the app. Output goes to `out` so the screens can be tested without
//! a terminal.
use anyhow::{Context as _, bail};
use bookshelf_core::library::Library;
use bookshelf_core::library::types::{BookDraft, BookRecord};
use bookshelf_core::storage::KeyValueStore;
use std::io::{BufRead, Write};
use tracing::instrument;

/// Fields given on the command line for `edit`; `None` keeps the current value.
#[derive(Debug, Default, Clone)]
pub struct FieldChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub status: Option<String>,
}

fn write_book(out: &mut impl Write, book: &BookRecord) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>14}  {} by {} [{}]",
        book.id, book.title, book.author, book.status
    )
}

/// Home screen: every book plus the last opened one.
#[instrument(name = "cmd.list", skip(library, out))]
pub async fn list<S: KeyValueStore>(
    library: &Library<S>,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let books = library.list_all().await;
    if json {
        serde_json::to_writer_pretty(&mut *out, &books)?;
        writeln!(out)?;
        return Ok(());
    }

    if let Some(last) = library.last_viewed_book().await {
        writeln!(out, "Last opened: {} by {}", last.title, last.author)?;
        writeln!(out)?;
    }
    if books.is_empty() {
        writeln!(out, "No books yet. Add one with `bookshelf add`.")?;
    }
    for book in &books {
        write_book(out, book)?;
    }
    tracing::debug!(count = books.len(), "listed books");
    Ok(())
}

/// Detail screen. Opening a book makes it the last viewed one.
#[instrument(name = "cmd.show", skip(library, out))]
pub async fn show<S: KeyValueStore>(
    library: &Library<S>,
    id: i64,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let Some(book) = library.get(id).await else {
        bail!("No book with id {id}");
    };
    library.set_last_viewed(book.id).await;

    writeln!(out, "Title:  {}", book.title)?;
    writeln!(out, "Author: {}", book.author)?;
    writeln!(out, "Status: {}", book.status)?;
    Ok(())
}

/// Add form.
#[instrument(name = "cmd.add", skip(library, out))]
pub async fn add<S: KeyValueStore>(
    library: &Library<S>,
    draft: BookDraft,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let draft = draft.validate()?;
    let book = library
        .create(draft)
        .await
        .context("Failed to save the new book")?;

    tracing::info!(id = book.id, "book added");
    writeln!(out, "Added book {}", book.id)?;
    Ok(())
}

/// Edit form, prefilled with the stored values.
#[instrument(name = "cmd.edit", skip(library, out))]
pub async fn edit<S: KeyValueStore>(
    library: &Library<S>,
    id: i64,
    changes: FieldChanges,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let Some(current) = library.get(id).await else {
        bail!("No book with id {id}");
    };

    let prefilled = BookDraft::from_record(&current);
    let draft = BookDraft::new(
        changes.title.unwrap_or(prefilled.title),
        changes.author.unwrap_or(prefilled.author),
        changes.status.unwrap_or(prefilled.status),
    )
    .validate()?;
    // the book may have been deleted since it was read above
    let saved = library
        .update(id, draft)
        .await
        .context("Failed to save the book")?;
    if saved.is_none() {
        bail!("No book with id {id}");
    }

    tracing::info!(id, "book updated");
    writeln!(out, "Updated book {id}")?;
    Ok(())
}

/// Delete action. Unless `confirmed`, asks on `input` first.
#[instrument(name = "cmd.delete", skip(library, input, out))]
pub async fn delete<S: KeyValueStore>(
    library: &Library<S>,
    id: i64,
    confirmed: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let Some(book) = library.get(id).await else {
        bail!("No book with id {id}");
    };

    if !confirmed {
        write!(out, "Delete \"{}\" by {}? [y/N] ", book.title, book.author)?;
        out.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            writeln!(out, "Cancelled")?;
            return Ok(());
        }
    }

    let removed = library
        .try_delete(id)
        .await
        .context("Failed to delete the book")?;
    if !removed {
        bail!("No book with id {id}");
    }
    tracing::info!(id, "book deleted");
    writeln!(out, "Deleted book {id}")?;
    Ok(())
}

/// Resolves the last viewed book; a pointer to a deleted book counts as none.
#[instrument(name = "cmd.last", skip(library, out))]
pub async fn last<S: KeyValueStore>(
    library: &Library<S>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match library.last_viewed_book().await {
        Some(book) => write_book(out, &book)?,
        None => writeln!(out, "No book opened yet.")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::errors::BackendError;
    use bookshelf_core::storage::MemoryStore;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use pretty_assertions::assert_eq;
    use std::io;

    /// Wraps a `MemoryStore` to act out what another process could do to the same library.
    #[derive(Debug, Default)]
    struct SharedStore {
        inner: MemoryStore,
        collection_reads: AtomicUsize,
        /// Every book disappears right after the collection has been read once.
        deleted_after_first_read: bool,
        fail_writes: bool,
    }

    impl KeyValueStore for SharedStore {
        async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
            let value = self.inner.get(key).await?;
            if key == "books"
                && self.deleted_after_first_read
                && self.collection_reads.fetch_add(1, Ordering::SeqCst) == 0
            {
                self.inner.remove(key).await?;
            }
            Ok(value)
        }

        async fn set(&self, key: &str, value: String) -> Result<(), BackendError> {
            if self.fail_writes {
                return Err(io::Error::other("disk full").into());
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), BackendError> {
            self.inner.remove(key).await
        }
    }

    fn draft(title: &str, author: &str, status: &str) -> BookDraft {
        BookDraft::new(title.to_owned(), author.to_owned(), status.to_owned())
    }

    fn stored(books: &[(i64, &str)]) -> MemoryStore {
        let records: Vec<BookRecord> = books
            .iter()
            .map(|&(id, title)| {
                BookRecord::new(id, title.to_owned(), "X".to_owned(), "reading".to_owned())
            })
            .collect();
        let encoded = bookshelf_core::library::codec::encode_books(&records).unwrap();
        MemoryStore::with_entries([("books", encoded)])
    }

    fn library_with(books: &[(i64, &str)]) -> Library<MemoryStore> {
        Library::new(stored(books))
    }

    fn text(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_list_empty() {
        let library = Library::new(MemoryStore::new());
        let mut out = Vec::new();

        list(&library, false, &mut out).await.unwrap();

        assert_eq!(text(out), "No books yet. Add one with `bookshelf add`.\n");
    }

    #[tokio::test]
    async fn test_show_then_list_mentions_last_opened() {
        let library = library_with(&[(1, "A"), (2, "B")]);
        let mut out = Vec::new();

        show(&library, 2, &mut out).await.unwrap();
        assert_eq!(text(out), "Title:  B\nAuthor: X\nStatus: reading\n");

        let mut out = Vec::new();
        list(&library, false, &mut out).await.unwrap();
        let shown = text(out);
        assert!(shown.starts_with("Last opened: B by X\n\n"));
        assert!(shown.contains("1  A by X [reading]"));
    }

    #[tokio::test]
    async fn test_show_unknown_id() {
        let library = library_with(&[(1, "A")]);

        let err = show(&library, 9, &mut io::sink()).await.unwrap_err();

        assert_eq!(err.to_string(), "No book with id 9");
        assert_eq!(library.last_viewed().await, None);
    }

    #[tokio::test]
    async fn test_list_json() {
        let library = library_with(&[(1, "A")]);
        let mut out = Vec::new();

        list(&library, true, &mut out).await.unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([{"id": 1, "title": "A", "author": "X", "status": "reading"}])
        );
    }

    #[tokio::test]
    async fn test_add_validates_before_saving() {
        let library = Library::new(MemoryStore::new());

        let err = add(&library, draft(" ", "X", ""), &mut io::sink())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "missing required fields: title, status");
        assert_eq!(library.list_all().await, vec![]);
    }

    #[tokio::test]
    async fn test_add_stores_trimmed_book() {
        let library = Library::new(MemoryStore::new());
        let mut out = Vec::new();

        add(&library, draft(" Dune ", "Frank Herbert", "to read"), &mut out)
            .await
            .unwrap();

        let books = library.list_all().await;
        assert_eq!(books.len(), 1);
        let book = books.first().unwrap();
        assert_eq!(
            (book.title.as_str(), book.author.as_str()),
            ("Dune", "Frank Herbert")
        );
        assert_eq!(text(out), format!("Added book {}\n", book.id));
    }

    #[tokio::test]
    async fn test_edit_keeps_unchanged_fields() {
        let library = library_with(&[(1, "A")]);
        let changes = FieldChanges {
            status: Some("read".to_owned()),
            ..FieldChanges::default()
        };

        edit(&library, 1, changes, &mut io::sink()).await.unwrap();

        assert_eq!(
            library.list_all().await,
            vec![BookRecord::new(
                1,
                "A".to_owned(),
                "X".to_owned(),
                "read".to_owned()
            )]
        );
    }

    #[tokio::test]
    async fn test_edit_rejects_blank_field() {
        let library = library_with(&[(1, "A")]);
        let changes = FieldChanges {
            author: Some("   ".to_owned()),
            ..FieldChanges::default()
        };

        assert!(edit(&library, 1, changes, &mut io::sink()).await.is_err());
        assert_eq!(library.get(1).await.unwrap().author, "X");
    }

    #[tokio::test]
    async fn test_edit_of_book_deleted_meanwhile_fails() {
        let library = Library::new(SharedStore {
            inner: stored(&[(1, "A")]),
            deleted_after_first_read: true,
            ..SharedStore::default()
        });
        let changes = FieldChanges {
            title: Some("A2".to_owned()),
            ..FieldChanges::default()
        };
        let mut out = Vec::new();

        let err = edit(&library, 1, changes, &mut out).await.unwrap_err();

        assert_eq!(err.to_string(), "No book with id 1");
        assert_eq!(text(out), "");
        assert_eq!(library.list_all().await, vec![]);
        assert_eq!(library.store().get("books").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_asks_first() {
        let library = library_with(&[(1, "A")]);
        let mut out = Vec::new();

        delete(&library, 1, false, &mut &b"n\n"[..], &mut out)
            .await
            .unwrap();

        assert_eq!(text(out), "Delete \"A\" by X? [y/N] Cancelled\n");
        assert_eq!(library.list_all().await.len(), 1);

        delete(&library, 1, false, &mut &b"yes\n"[..], &mut io::sink())
            .await
            .unwrap();
        assert_eq!(library.list_all().await, vec![]);
    }

    #[tokio::test]
    async fn test_delete_confirmed_skips_prompt() {
        let library = library_with(&[(1, "A"), (2, "B")]);
        let mut out = Vec::new();

        delete(&library, 1, true, &mut &b""[..], &mut out)
            .await
            .unwrap();

        assert_eq!(text(out), "Deleted book 1\n");
        assert_eq!(library.get(1).await, None);
    }

    #[tokio::test]
    async fn test_delete_reports_failed_write() {
        let library = Library::new(SharedStore {
            inner: stored(&[(1, "A")]),
            fail_writes: true,
            ..SharedStore::default()
        });
        let mut out = Vec::new();

        let err = delete(&library, 1, true, &mut &b""[..], &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to delete the book");
        assert_eq!(text(out), "");
        assert_eq!(library.list_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_last_after_delete() {
        let library = library_with(&[(1, "A")]);
        show(&library, 1, &mut io::sink()).await.unwrap();
        delete(&library, 1, true, &mut &b""[..], &mut io::sink())
            .await
            .unwrap();
        let mut out = Vec::new();

        last(&library, &mut out).await.unwrap();

        assert_eq!(text(out), "No book opened yet.\n");
    }
}
