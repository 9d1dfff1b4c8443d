//! The version store: CRUD over document version chains.

use crate::config::{StoreConfig, DEFAULT_STREAM_BUFFER};
use crate::error::{StoreError, StoreResult};
use crate::key::{KeyScheme, StampScheme};
use crate::types::{Created, DocId, Updated, VersionKey};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use vellum_storage::{DocumentBackend, FileBackend, InMemoryBackend};

/// A versioned document store.
///
/// Each document is an append-only set of immutable versions addressed by
/// keys from a [`KeyScheme`]. All operations are `async`; backend calls run
/// on tokio's blocking pool, so a slow disk never stalls the scheduler.
///
/// Cloning is cheap and clones share the same backend.
///
/// # Invariants
///
/// - A version key is written at most once; nothing ever overwrites it
/// - `create` succeeds at most once per document id, even under concurrency
/// - Replicated entries pass the same key checks as local writes
///
/// # Example
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> vellum_core::StoreResult<()> {
/// use vellum_core::VersionStore;
///
/// let store = VersionStore::in_memory();
/// let created = store.create("doc1", "hello").await?;
/// let updated = store.update(&created.key, "world").await?;
///
/// assert_eq!(store.read(&created.key).await?, "hello");
/// assert_eq!(store.history("doc1").await?.len(), 2);
/// assert_eq!(updated.prev, created.key);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct VersionStore {
    backend: Arc<dyn DocumentBackend>,
    scheme: Arc<dyn KeyScheme>,
    stream_buffer: usize,
}

impl VersionStore {
    /// Opens a file-backed store using the [`StampScheme`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The root is missing and `create_if_missing` is false
    /// - Another process has the store open
    /// - I/O errors occur
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        let path = config.path.clone();
        let create_if_missing = config.create_if_missing;
        let sync_writes = config.sync_writes;

        let backend = tokio::task::spawn_blocking(move || {
            let backend = if create_if_missing {
                FileBackend::open_with_create_dirs(&path)?
            } else {
                FileBackend::open(&path)?
            };
            Ok::<_, StoreError>(backend.with_sync_writes(sync_writes))
        })
        .await??;

        info!(path = %config.path.display(), "opened version store");

        Ok(Self::with_backend(Arc::new(backend), Arc::new(StampScheme::new()))
            .with_stream_buffer(config.stream_buffer))
    }

    /// Creates an empty in-memory store using the [`StampScheme`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_backend(
            Arc::new(InMemoryBackend::new()),
            Arc::new(StampScheme::new()),
        )
    }

    /// Creates a store over any backend and key scheme.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn DocumentBackend>, scheme: Arc<dyn KeyScheme>) -> Self {
        Self {
            backend,
            scheme,
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }

    /// Sets how many entries `source()` buffers ahead of its consumer.
    #[must_use]
    pub fn with_stream_buffer(mut self, entries: usize) -> Self {
        self.stream_buffer = entries.max(1);
        self
    }

    /// Returns the key scheme in use.
    #[must_use]
    pub fn scheme(&self) -> &dyn KeyScheme {
        self.scheme.as_ref()
    }

    /// Creates a document with its first version.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidId` if `doc` is malformed or is itself a valid version key
    /// - `DocExists` if the document already exists
    /// - `Backend` for storage failures
    pub async fn create(
        &self,
        doc: impl Into<DocId>,
        value: impl Into<Bytes>,
    ) -> StoreResult<Created> {
        let doc = doc.into();
        if !doc.is_well_formed() || self.scheme.validate(doc.as_str()) {
            return Err(StoreError::invalid_id(doc.into_string()));
        }

        let key = self.scheme.new_key(&doc);
        let value = value.into();

        let (doc_name, raw_key, raw_value) = (doc.clone(), key.clone(), value.clone());
        self.blocking(move |backend| {
            backend.create_document(doc_name.as_str())?;
            backend.insert_version(doc_name.as_str(), raw_key.as_str(), &raw_value)?;
            Ok(())
        })
        .await?;

        debug!(doc = %doc, key = %key, "created document");
        Ok(Created { key, value })
    }

    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidKey` if `key` is malformed
    /// - `NotFound` if no such version is stored
    pub async fn read(&self, key: &VersionKey) -> StoreResult<Bytes> {
        let doc = self.owner(key)?;
        let key = key.clone();

        let value = self
            .blocking(move |backend| Ok(backend.read_version(doc.as_str(), key.as_str())?))
            .await?;
        Ok(Bytes::from(value))
    }

    /// Stores a new version descending from `parent`.
    ///
    /// `parent` only has to be well formed; it need not still be stored, so
    /// a branch can grow from a deleted version.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidKey` if `parent` is malformed
    /// - `NotFound` if the owning document has never been created
    /// - `VersionExists` if the minted key is already taken
    pub async fn update(&self, parent: &VersionKey, value: impl Into<Bytes>) -> StoreResult<Updated> {
        if !self.scheme.validate(parent.as_str()) {
            return Err(StoreError::invalid_key(parent.as_str()));
        }
        let doc = self.owner(parent)?;
        let key = self
            .scheme
            .update_key(parent)
            .ok_or_else(|| StoreError::invalid_key(parent.as_str()))?;
        let value = value.into();

        let (raw_key, raw_value) = (key.clone(), value.clone());
        self.blocking(move |backend| {
            Ok(backend.insert_version(doc.as_str(), raw_key.as_str(), &raw_value)?)
        })
        .await?;

        debug!(key = %key, prev = %parent, "updated document");
        Ok(Updated {
            key,
            prev: parent.clone(),
            value,
        })
    }

    /// Deletes one version. Other versions of the document are untouched.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidKey` if `key` is malformed
    /// - `NotFound` if no such version is stored
    pub async fn del(&self, key: &VersionKey) -> StoreResult<()> {
        let doc = self.owner(key)?;
        let raw_key = key.clone();

        self.blocking(move |backend| Ok(backend.remove_version(doc.as_str(), raw_key.as_str())?))
            .await?;

        debug!(key = %key, "deleted version");
        Ok(())
    }

    /// Lists every known document.
    ///
    /// Documents stay listed after their last version is deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be listed.
    pub async fn docs(&self) -> StoreResult<Vec<DocId>> {
        let docs = self
            .blocking(|backend| Ok(backend.list_documents()?))
            .await?;
        Ok(docs.into_iter().map(DocId::from).collect())
    }

    /// Lists every stored version key of `doc`.
    ///
    /// Stored names that are not valid keys of `doc` are skipped.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidId` if `doc` is malformed
    /// - `NotFound` if the document has never been created
    pub async fn history(&self, doc: impl Into<DocId>) -> StoreResult<Vec<VersionKey>> {
        let doc = doc.into();
        if !doc.is_well_formed() {
            return Err(StoreError::invalid_id(doc.into_string()));
        }

        let name = doc.clone();
        let keys = self
            .blocking(move |backend| Ok(backend.list_versions(name.as_str())?))
            .await?;

        Ok(keys
            .into_iter()
            .map(VersionKey::from)
            .filter(|key| self.scheme.doc_id(key).as_ref() == Some(&doc))
            .collect())
    }

    /// Resolves the document owning `key`.
    ///
    /// The owner must satisfy the same rules `create` applies to a new id,
    /// so a key naming an id that is itself a key is rejected.
    pub(crate) fn owner(&self, key: &VersionKey) -> StoreResult<DocId> {
        self.scheme
            .doc_id(key)
            .filter(|doc| doc.is_well_formed() && !self.scheme.validate(doc.as_str()))
            .ok_or_else(|| StoreError::invalid_key(key.as_str()))
    }

    pub(crate) fn backend(&self) -> Arc<dyn DocumentBackend> {
        Arc::clone(&self.backend)
    }

    pub(crate) fn scheme_handle(&self) -> Arc<dyn KeyScheme> {
        Arc::clone(&self.scheme)
    }

    pub(crate) fn stream_buffer(&self) -> usize {
        self.stream_buffer
    }

    /// Runs a backend call on the blocking pool.
    pub(crate) async fn blocking<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&dyn DocumentBackend) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || f(backend.as_ref())).await?
    }
}

impl fmt::Debug for VersionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionStore")
            .field("scheme", &self.scheme)
            .field("stream_buffer", &self.stream_buffer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn create_then_read() {
        let store = VersionStore::in_memory();
        let created = store.create("doc1", "hello").await.unwrap();

        assert_eq!(created.value, "hello");
        assert_eq!(store.read(&created.key).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn create_twice_is_doc_exists() {
        let store = VersionStore::in_memory();
        store.create("doc1", "a").await.unwrap();

        let err = store.create("doc1", "b").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DocExists);
    }

    #[tokio::test]
    async fn numeric_ids_are_documents() {
        let store = VersionStore::in_memory();
        let created = store.create(42u64, "answer").await.unwrap();

        assert_eq!(store.scheme().doc_id(&created.key), Some(DocId::from("42")));
        assert_eq!(store.docs().await.unwrap(), vec![DocId::from("42")]);

        let err = store.create(42, "again").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DocExists);
        store.create(-7, "negative").await.unwrap();
        store.create(7u32, "small").await.unwrap();
        assert_eq!(store.history(-7).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_key_shaped_ids() {
        let store = VersionStore::in_memory();
        let created = store.create("doc1", "a").await.unwrap();

        let err = store.create(created.key.as_str(), "b").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidId);

        let err = store.create("../up", "b").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidId);
    }

    #[tokio::test]
    async fn update_returns_parent() {
        let store = VersionStore::in_memory();
        let created = store.create("doc1", "v1").await.unwrap();
        let updated = store.update(&created.key, "v2").await.unwrap();

        assert_eq!(updated.prev, created.key);
        assert_eq!(updated.value, "v2");
        assert!(store.scheme().descends_from(&updated.key, &created.key));
    }

    #[tokio::test]
    async fn update_rejects_malformed_key() {
        let store = VersionStore::in_memory();
        let err = store
            .update(&VersionKey::from("not-a-key"), "v")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);
    }

    #[tokio::test]
    async fn update_from_deleted_parent() {
        let store = VersionStore::in_memory();
        let created = store.create("doc1", "v1").await.unwrap();
        store.del(&created.key).await.unwrap();

        let updated = store.update(&created.key, "v2").await.unwrap();
        assert_eq!(store.history("doc1").await.unwrap(), vec![updated.key]);
    }

    #[tokio::test]
    async fn update_of_unknown_document_is_not_found() {
        let store = VersionStore::in_memory();
        let foreign = store.scheme().new_key(&DocId::from("ghost"));

        let err = store.update(&foreign, "v").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn read_and_del_missing() {
        let store = VersionStore::in_memory();
        let created = store.create("doc1", "v1").await.unwrap();
        store.del(&created.key).await.unwrap();

        assert_eq!(
            store.read(&created.key).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            store.del(&created.key).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            store.read(&VersionKey::from("junk")).await.unwrap_err().kind(),
            ErrorKind::InvalidKey
        );
    }

    #[tokio::test]
    async fn nested_keys_are_invalid() {
        let store = VersionStore::in_memory();
        let created = store.create("a", "v1").await.unwrap();
        let nested = store.scheme().new_key(&DocId::from(created.key.as_str()));

        assert_eq!(store.read(&nested).await.unwrap_err().kind(), ErrorKind::InvalidKey);
        assert_eq!(store.del(&nested).await.unwrap_err().kind(), ErrorKind::InvalidKey);
        assert_eq!(
            store.update(&nested, "v2").await.unwrap_err().kind(),
            ErrorKind::InvalidKey
        );
    }

    #[tokio::test]
    async fn history_of_unknown_document() {
        let store = VersionStore::in_memory();
        let err = store.history("nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn deleted_last_version_keeps_document_listed() {
        let store = VersionStore::in_memory();
        let created = store.create("doc1", "v1").await.unwrap();
        store.del(&created.key).await.unwrap();

        assert_eq!(store.docs().await.unwrap(), vec![DocId::from("doc1")]);
        assert!(store.history("doc1").await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_have_one_winner() {
        let store = VersionStore::in_memory();
        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create("contested", format!("v{i}")).await })
            })
            .collect();

        let mut winners = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => winners += 1,
                Err(e) => assert_eq!(e.kind(), ErrorKind::DocExists),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(store.history("contested").await.unwrap().len(), 1);
    }
}
