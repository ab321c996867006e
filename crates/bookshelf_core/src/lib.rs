//! `bookshelf_core`
//!
//! Core library of Bookshelf: the book collection and its persistence, independent of whatever
//! front end presents it. The `Library` store works on top of any `KeyValueStore`, so the same
//! logic runs against a SQLite file, a JSON file or plain memory.

pub mod errors;

pub mod library;

pub mod storage;
