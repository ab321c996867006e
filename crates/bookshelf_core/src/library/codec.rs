//! Encoding of the two persisted entries.
//!
//! `books` holds a versioned envelope `{"version": 1, "books": [...]}`. Collections written before
//! the envelope existed are a bare JSON array of records and still decode, as version 0.
//! `lastBook` holds the decimal text of a book id.
use crate::errors::DecodeError;
use crate::library::types::BookRecord;
use serde::{Deserialize, Serialize};

pub const BOOKS_KEY: &str = "books";
pub const LAST_BOOK_KEY: &str = "lastBook";
pub const CURRENT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'books> {
    version: u32,
    books: &'books [BookRecord],
}

/// Records of an envelope stay raw until its version is known to be readable, since a newer
/// version may have changed their shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum Stored {
    Versioned {
        version: u32,
        books: serde_json::Value,
    },
    Legacy(Vec<BookRecord>),
}

/// # Errors
/// Only fails if a record cannot be serialized, which `serde_json` never does for plain strings
/// and integers.
#[allow(clippy::missing_inline_in_public_items, reason = "Called on every write")]
pub fn encode_books(books: &[BookRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&EnvelopeRef {
        version: CURRENT_VERSION,
        books,
    })
}

/// # Errors
/// Fails on anything that is neither an envelope nor a bare array of records, and on envelopes
/// written by a newer version.
#[allow(clippy::missing_inline_in_public_items, reason = "Called on every read")]
pub fn decode_books(raw: &str) -> Result<Vec<BookRecord>, DecodeError> {
    match serde_json::from_str::<Stored>(raw)? {
        Stored::Versioned { version, books } if version <= CURRENT_VERSION => {
            Ok(serde_json::from_value(books)?)
        }
        Stored::Versioned { version, .. } => Err(DecodeError::UnsupportedVersion {
            found: version,
            supported: CURRENT_VERSION,
        }),
        Stored::Legacy(books) => Ok(books),
    }
}

#[must_use]
#[inline]
pub fn encode_last_book(id: i64) -> String {
    id.to_string()
}

/// # Errors
/// Fails if `raw` is not a decimal integer.
#[inline]
pub fn decode_last_book(raw: &str) -> Result<i64, DecodeError> {
    raw.trim()
        .parse()
        .map_err(|_err| DecodeError::NotAnId(raw.to_owned()))
}
