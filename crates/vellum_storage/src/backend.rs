//! Storage backend trait definition.

use crate::error::StorageResult;

/// A document storage backend for Vellum.
///
/// Backends group opaque byte values under a document name and a version
/// key. Vellum owns the meaning of keys; backends only store them.
///
/// # Invariants
///
/// - `create_document` and `insert_version` are atomic "create if absent"
///   operations: when two callers race on the same name, exactly one succeeds
/// - `read_version` returns exactly the bytes passed to `insert_version`,
///   never a partial write
/// - Listings only contain names created through this trait, never internal
///   bookkeeping artifacts
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait DocumentBackend: Send + Sync {
    /// Returns true if a container exists for `doc`.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn contains_document(&self, doc: &str) -> StorageResult<bool>;

    /// Creates the container for `doc`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentExists` if the container is already present.
    fn create_document(&self, doc: &str) -> StorageResult<()>;

    /// Creates the container for `doc` unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn ensure_document(&self, doc: &str) -> StorageResult<()>;

    /// Stores `value` under `key` in `doc`, failing if `key` is taken.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `DocumentNotFound` if the container for `doc` does not exist
    /// - `VersionExists` if a value is already stored under `key`
    /// - `Io` for any underlying failure
    fn insert_version(&self, doc: &str, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Reads the value stored under `key` in `doc`.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if no value is stored under `key`.
    fn read_version(&self, doc: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Returns true if a value is stored under `key` in `doc`.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn contains_version(&self, doc: &str, key: &str) -> StorageResult<bool>;

    /// Removes the value stored under `key` in `doc`.
    ///
    /// The container itself is kept even when its last version is removed.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if no value is stored under `key`.
    fn remove_version(&self, doc: &str, key: &str) -> StorageResult<()>;

    /// Lists every document container, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn list_documents(&self) -> StorageResult<Vec<String>>;

    /// Lists every version key stored in `doc`, sorted.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` if the container for `doc` does not exist.
    fn list_versions(&self, doc: &str) -> StorageResult<Vec<String>>;
}
