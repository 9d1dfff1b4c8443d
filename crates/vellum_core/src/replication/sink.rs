//! Replication sink: applies an entry stream through the store's write path.

use crate::error::{StoreError, StoreResult};
use crate::store::VersionStore;
use crate::types::{Entry, SinkReport};
use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

impl VersionStore {
    /// Applies every entry of `entries`, in order, one at a time.
    ///
    /// For each entry the key must be valid under this store's scheme and
    /// must not already be stored; the value is then written exactly as a
    /// local `create`/`update` would write it, creating the owning document
    /// if needed. The next entry is not pulled until the current one has
    /// been committed.
    ///
    /// # Errors
    ///
    /// Aborts on the first failure, leaving later entries unapplied:
    /// - `InvalidKey` if an entry's key is malformed
    /// - `VersionExists` if an entry's key is already stored
    /// - the upstream error, converted, if the stream itself fails
    /// - `Backend` for storage failures
    pub async fn sink<S, E>(&self, entries: S) -> StoreResult<SinkReport>
    where
        S: Stream<Item = Result<Entry, E>>,
        E: Into<StoreError>,
    {
        futures::pin_mut!(entries);
        let mut report = SinkReport::default();

        while let Some(item) = entries.next().await {
            let outcome = match item {
                Ok(entry) => self.apply(entry).await,
                Err(e) => Err(e.into()),
            };

            if let Err(e) = outcome {
                warn!(applied = report.applied, error = %e, "sink aborted");
                return Err(e);
            }
            report.applied += 1;
        }

        info!(applied = report.applied, "sink complete");
        Ok(report)
    }

    /// Streams this store's entire corpus into `target`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by either side; see [`VersionStore::sink`].
    pub async fn replicate_to(&self, target: &VersionStore) -> StoreResult<SinkReport> {
        target.sink(self.source()).await
    }

    async fn apply(&self, entry: Entry) -> StoreResult<()> {
        if !self.scheme().validate(entry.key.as_str()) {
            return Err(StoreError::invalid_key(entry.key.into_string()));
        }
        let doc = self.owner(&entry.key)?;

        let Entry { key, value } = entry;
        let applied_key = key.clone();
        self.blocking(move |backend| {
            backend.ensure_document(doc.as_str())?;
            Ok(backend.insert_version(doc.as_str(), key.as_str(), &value)?)
        })
        .await?;

        debug!(key = %applied_key, "applied replicated entry");
        Ok(())
    }
}
