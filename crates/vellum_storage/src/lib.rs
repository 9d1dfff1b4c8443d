//! # Vellum Storage
//!
//! Document storage backends for Vellum.
//!
//! This crate provides the lowest-level storage abstraction for Vellum.
//! A backend maps `(document, version key)` pairs to **opaque byte values**.
//! It never interprets keys or values; key minting and validation belong to
//! `vellum_core`.
//!
//! ## Design Principles
//!
//! - Backends are simple keyed byte stores grouped by document
//! - Inserts are atomic "insert if absent": a key is written at most once
//! - Readers never observe a partially written value
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - One directory per document, one file per version
//!
//! ## Example
//!
//! ```rust
//! use vellum_storage::{DocumentBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.create_document("notes").unwrap();
//! backend.insert_version("notes", "v1", b"hello world").unwrap();
//! assert_eq!(backend.read_version("notes", "v1").unwrap(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::DocumentBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
