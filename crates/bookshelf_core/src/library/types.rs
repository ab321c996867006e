use serde::{Deserialize, Serialize};

/// A single entry of the collection.
#[non_exhaustive]
#[derive(Serialize, Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub status: String,
}

impl BookRecord {
    #[must_use]
    #[inline]
    pub const fn new(id: i64, title: String, author: String, status: String) -> Self {
        Self {
            id,
            title,
            author,
            status,
        }
    }

    /// Builds a record for `id` out of an already validated draft.
    #[must_use]
    #[inline]
    pub fn from_draft(id: i64, draft: ValidDraft) -> Self {
        let ValidDraft(draft) = draft;
        Self::new(id, draft.title, draft.author, draft.status)
    }

    /// Copies the mutable fields of `other` into `self`. The id never changes.
    #[inline]
    pub fn replace_fields(&mut self, other: Self) {
        self.title = other.title;
        self.author = other.author;
        self.status = other.status;
    }
}

/// Unsaved form contents for adding or editing a book.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub status: String,
}

impl BookDraft {
    #[must_use]
    #[inline]
    pub const fn new(title: String, author: String, status: String) -> Self {
        Self {
            title,
            author,
            status,
        }
    }

    /// Prefills a draft with the current values of `book`, as the edit form does.
    #[must_use]
    #[inline]
    pub fn from_record(book: &BookRecord) -> Self {
        Self::new(book.title.clone(), book.author.clone(), book.status.clone())
    }

    /// Trims every field and checks that none of them ended up empty.
    /// # Errors
    /// Returns a `ValidationError` naming every empty field.
    #[allow(clippy::missing_inline_in_public_items, reason = "Called once per form submit")]
    pub fn validate(self) -> Result<ValidDraft, ValidationError> {
        let title = self.title.trim().to_owned();
        let author = self.author.trim().to_owned();
        let status = self.status.trim().to_owned();

        let fields: Vec<&'static str> = [("title", &title), ("author", &author), ("status", &status)]
            .into_iter()
            .filter(|&(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect();

        if fields.is_empty() {
            Ok(ValidDraft(Self::new(title, author, status)))
        } else {
            Err(ValidationError { fields })
        }
    }
}

/// A draft whose fields are all non-empty. Only obtainable through `BookDraft::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft(BookDraft);

impl ValidDraft {
    #[must_use]
    #[inline]
    pub const fn draft(&self) -> &BookDraft {
        &self.0
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required fields: {}", .fields.join(", "))]
pub struct ValidationError {
    pub fields: Vec<&'static str>,
}
