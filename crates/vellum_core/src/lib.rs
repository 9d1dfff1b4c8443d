//! # Vellum Core
//!
//! Versioned document store for Vellum.
//!
//! This crate provides:
//! - [`VersionStore`] for CRUD over append-only version chains
//! - [`KeyScheme`], the pluggable strategy that mints and validates version
//!   keys, and its default implementation [`StampScheme`]
//! - Streaming replication: [`VersionStore::source`] and
//!   [`VersionStore::sink`]
//!
//! ## Key Invariants
//!
//! - Version keys are unique within a document and never overwritten
//! - A document id can be created once
//! - Every version key resolves to exactly one owning document
//! - Replicated entries pass the same checks as locally written ones

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod key;
mod replication;
mod store;
mod types;

pub use config::{StoreConfig, DEFAULT_STREAM_BUFFER};
pub use error::{ErrorKind, StoreError, StoreResult};
pub use key::{KeyScheme, StampScheme};
pub use replication::EntryStream;
pub use store::VersionStore;
pub use types::{Created, DocId, Entry, SinkReport, Updated, VersionKey, MAX_DOC_ID_LEN};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
