//! In-memory storage backend for testing.

use crate::backend::DocumentBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

type Documents = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

/// An in-memory storage backend.
///
/// This backend stores all documents in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads. Every
/// check-and-insert happens under a single write lock, so the "if absent"
/// operations are atomic.
///
/// # Example
///
/// ```rust
/// use vellum_storage::{DocumentBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.create_document("doc").unwrap();
/// backend.insert_version("doc", "k1", b"data").unwrap();
/// assert_eq!(backend.list_versions("doc").unwrap(), vec!["k1".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    docs: RwLock<Documents>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored versions across all documents.
    #[must_use]
    pub fn version_count(&self) -> usize {
        self.docs.read().values().map(BTreeMap::len).sum()
    }
}

impl DocumentBackend for InMemoryBackend {
    fn contains_document(&self, doc: &str) -> StorageResult<bool> {
        Ok(self.docs.read().contains_key(doc))
    }

    fn create_document(&self, doc: &str) -> StorageResult<()> {
        match self.docs.write().entry(doc.to_string()) {
            Entry::Occupied(_) => Err(StorageError::document_exists(doc)),
            Entry::Vacant(slot) => {
                slot.insert(BTreeMap::new());
                Ok(())
            }
        }
    }

    fn ensure_document(&self, doc: &str) -> StorageResult<()> {
        self.docs.write().entry(doc.to_string()).or_default();
        Ok(())
    }

    fn insert_version(&self, doc: &str, key: &str, value: &[u8]) -> StorageResult<()> {
        let mut docs = self.docs.write();
        let versions = docs
            .get_mut(doc)
            .ok_or_else(|| StorageError::document_not_found(doc))?;

        match versions.entry(key.to_string()) {
            Entry::Occupied(_) => Err(StorageError::version_exists(doc, key)),
            Entry::Vacant(slot) => {
                slot.insert(value.to_vec());
                Ok(())
            }
        }
    }

    fn read_version(&self, doc: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.docs
            .read()
            .get(doc)
            .and_then(|versions| versions.get(key))
            .cloned()
            .ok_or_else(|| StorageError::version_not_found(doc, key))
    }

    fn contains_version(&self, doc: &str, key: &str) -> StorageResult<bool> {
        Ok(self
            .docs
            .read()
            .get(doc)
            .is_some_and(|versions| versions.contains_key(key)))
    }

    fn remove_version(&self, doc: &str, key: &str) -> StorageResult<()> {
        self.docs
            .write()
            .get_mut(doc)
            .and_then(|versions| versions.remove(key))
            .map(|_| ())
            .ok_or_else(|| StorageError::version_not_found(doc, key))
    }

    fn list_documents(&self) -> StorageResult<Vec<String>> {
        Ok(self.docs.read().keys().cloned().collect())
    }

    fn list_versions(&self, doc: &str) -> StorageResult<Vec<String>> {
        self.docs
            .read()
            .get(doc)
            .map(|versions| versions.keys().cloned().collect())
            .ok_or_else(|| StorageError::document_not_found(doc))
    }
}
