//! Streaming replication between stores.
//!
//! A [`crate::VersionStore::source`] on one store produces every stored
//! `(key, value)` pair as a lazy stream; a [`crate::VersionStore::sink`] on
//! another store consumes such a stream and commits each entry through the
//! same checks local writes go through. The two ends only share the stream,
//! so any transport that can carry entries (a channel, a socket, a file) can
//! sit in between.
//!
//! ## Guarantees
//!
//! - Entries are applied one at a time, in arrival order; the next entry is
//!   not pulled until the previous one is durable
//! - The first rejected entry (`InvalidKey`, `VersionExists`) or upstream
//!   failure aborts the whole sink; entries after it are never applied
//! - Existing versions are never overwritten
//!
//! There is no cross-entry atomicity: an aborted sink leaves the prefix it
//! already committed in place.

mod sink;
mod source;

use crate::error::StoreResult;
use crate::types::Entry;
use futures::stream::BoxStream;

/// Lazy stream of entries produced by [`crate::VersionStore::source`].
pub type EntryStream = BoxStream<'static, StoreResult<Entry>>;
