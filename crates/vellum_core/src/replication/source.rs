//! Replication source: walks the store into a bounded channel.

use super::EntryStream;
use crate::error::StoreResult;
use crate::key::KeyScheme;
use crate::store::VersionStore;
use crate::types::{DocId, Entry, VersionKey};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, trace};
use vellum_storage::DocumentBackend;

impl VersionStore {
    /// Streams every stored version of every document.
    ///
    /// Each call starts a fresh walk on tokio's blocking pool the first time
    /// the stream is polled, so the stream can be built outside a runtime.
    /// The walk stays at most `stream_buffer` entries ahead of the consumer
    /// and stops when the stream is dropped. A storage failure is delivered
    /// as a final `Err` item, after which the stream ends. Versions deleted
    /// while the walk is in progress are skipped, as are stored names which
    /// are not valid keys of their document.
    #[must_use]
    pub fn source(&self) -> EntryStream {
        let buffer = self.stream_buffer();
        let backend = self.backend();
        let scheme = self.scheme_handle();

        stream::once(async move {
            let (tx, rx) = mpsc::channel(buffer);
            tokio::task::spawn_blocking(move || {
                if let Err(e) = walk(backend.as_ref(), scheme.as_ref(), &tx) {
                    debug!(error = %e, "source walk failed");
                    let _ = tx.blocking_send(Err(e));
                }
            });
            ReceiverStream::new(rx)
        })
        .flatten()
        .boxed()
    }
}

fn walk(
    backend: &dyn DocumentBackend,
    scheme: &dyn KeyScheme,
    tx: &mpsc::Sender<StoreResult<Entry>>,
) -> StoreResult<()> {
    let mut sent = 0u64;

    for doc in backend.list_documents()? {
        let keys = match backend.list_versions(&doc) {
            Ok(keys) => keys,
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e.into()),
        };

        let owner = DocId::from(doc.as_str());
        for raw in keys {
            let key = VersionKey::from(raw);
            if scheme.doc_id(&key).as_ref() != Some(&owner) {
                trace!(doc = %owner, key = %key, "skipping non-version entry");
                continue;
            }

            let value = match backend.read_version(&doc, key.as_str()) {
                Ok(value) => value,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e.into()),
            };

            let entry = Entry {
                key,
                value: Bytes::from(value),
            };
            if tx.blocking_send(Ok(entry)).is_err() {
                debug!(sent, "source consumer went away");
                return Ok(());
            }
            sent += 1;
        }
    }

    debug!(sent, "source walk complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::key::StampScheme;
    use futures::TryStreamExt;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use vellum_storage::{InMemoryBackend, StorageError, StorageResult};

    /// Wraps a shared backend, counting reads and optionally failing one key.
    struct Instrumented {
        inner: Arc<dyn DocumentBackend>,
        fail_key: Option<String>,
        reads: AtomicUsize,
    }

    impl Instrumented {
        fn new(inner: Arc<dyn DocumentBackend>) -> Self {
            Self {
                inner,
                fail_key: None,
                reads: AtomicUsize::new(0),
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl DocumentBackend for Instrumented {
        fn contains_document(&self, doc: &str) -> StorageResult<bool> {
            self.inner.contains_document(doc)
        }

        fn create_document(&self, doc: &str) -> StorageResult<()> {
            self.inner.create_document(doc)
        }

        fn ensure_document(&self, doc: &str) -> StorageResult<()> {
            self.inner.ensure_document(doc)
        }

        fn insert_version(&self, doc: &str, key: &str, value: &[u8]) -> StorageResult<()> {
            self.inner.insert_version(doc, key, value)
        }

        fn read_version(&self, doc: &str, key: &str) -> StorageResult<Vec<u8>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_key.as_deref() == Some(key) {
                return Err(StorageError::Io(std::io::Error::other("injected read failure")));
            }
            self.inner.read_version(doc, key)
        }

        fn contains_version(&self, doc: &str, key: &str) -> StorageResult<bool> {
            self.inner.contains_version(doc, key)
        }

        fn remove_version(&self, doc: &str, key: &str) -> StorageResult<()> {
            self.inner.remove_version(doc, key)
        }

        fn list_documents(&self) -> StorageResult<Vec<String>> {
            self.inner.list_documents()
        }

        fn list_versions(&self, doc: &str) -> StorageResult<Vec<String>> {
            self.inner.list_versions(doc)
        }
    }

    #[tokio::test]
    async fn source_of_empty_store() {
        let store = VersionStore::in_memory();
        let entries: Vec<_> = store.source().try_collect().await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn source_yields_every_version_once() {
        let store = VersionStore::in_memory();
        let a = store.create("a", "a1").await.unwrap();
        let a2 = store.update(&a.key, "a2").await.unwrap();
        let b = store.create("b", "b1").await.unwrap();

        let entries: Vec<Entry> = store.source().try_collect().await.unwrap();
        let keys: BTreeSet<_> = entries.iter().map(|e| e.key.clone()).collect();

        assert_eq!(entries.len(), 3);
        assert_eq!(keys, BTreeSet::from([a.key, a2.key, b.key]));
    }

    #[tokio::test]
    async fn source_is_restartable() {
        let store = VersionStore::in_memory();
        store.create("a", "a1").await.unwrap();

        let first: Vec<_> = store.source().try_collect().await.unwrap();
        store.create("b", "b1").await.unwrap();
        let second: Vec<_> = store.source().try_collect().await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn source_skips_foreign_names() {
        let backend = Arc::new(InMemoryBackend::new());
        let store = VersionStore::with_backend(backend.clone(), Arc::new(StampScheme::new()));
        let created = store.create("a", "a1").await.unwrap();
        backend.insert_version("a", "scratch", b"not a version").unwrap();

        let entries: Vec<Entry> = store.source().try_collect().await.unwrap();
        assert_eq!(entries, vec![Entry::new(created.key, "a1")]);
    }

    #[tokio::test]
    async fn source_surfaces_read_failure_as_last_item() {
        let inner: Arc<dyn DocumentBackend> = Arc::new(InMemoryBackend::new());
        let seed = VersionStore::with_backend(Arc::clone(&inner), Arc::new(StampScheme::new()));
        let created = seed.create("a", "a1").await.unwrap();
        seed.create("b", "b1").await.unwrap();

        let failing = Instrumented {
            fail_key: Some(created.key.into_string()),
            ..Instrumented::new(inner)
        };
        let store = VersionStore::with_backend(Arc::new(failing), Arc::new(StampScheme::new()));

        let items: Vec<StoreResult<Entry>> = store.source().collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap_err().kind(), ErrorKind::BackendIo);
    }

    #[tokio::test]
    async fn source_stops_when_dropped() {
        let inner: Arc<dyn DocumentBackend> = Arc::new(InMemoryBackend::new());
        let seed = VersionStore::with_backend(Arc::clone(&inner), Arc::new(StampScheme::new()));
        for i in 0..10u64 {
            seed.create(i, "v").await.unwrap();
        }

        let counted = Arc::new(Instrumented::new(inner));
        let store = VersionStore::with_backend(counted.clone(), Arc::new(StampScheme::new()))
            .with_stream_buffer(1);

        let mut stream = store.source();
        assert!(stream.next().await.unwrap().is_ok());

        // One entry taken, one buffered, one blocked in send.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(counted.reads() <= 3, "walk ran ahead: {} reads", counted.reads());

        drop(stream);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let after_drop = counted.reads();
        assert!(after_drop <= 3, "walk continued after drop: {after_drop} reads");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counted.reads(), after_drop);

        // The store stays usable after an abandoned walk.
        assert_eq!(store.docs().await.unwrap().len(), 10);
    }

    #[test]
    fn source_builds_outside_runtime() {
        let backend = Arc::new(InMemoryBackend::new());
        let key = StampScheme::new().new_key(&DocId::from("a"));
        backend.create_document("a").unwrap();
        backend.insert_version("a", key.as_str(), b"v").unwrap();
        let store = VersionStore::with_backend(backend, Arc::new(StampScheme::new()));

        let stream = store.source();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let entries: Vec<Entry> = rt.block_on(stream.try_collect()).unwrap();
        assert_eq!(entries, vec![Entry::new(key, "v")]);
    }
}
