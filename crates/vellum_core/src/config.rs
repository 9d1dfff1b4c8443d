//! Store configuration.

use std::path::{Path, PathBuf};

/// Default number of entries buffered between a source and its consumer.
pub const DEFAULT_STREAM_BUFFER: usize = 64;

/// Configuration for opening a file-backed store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory of the store.
    pub path: PathBuf,

    /// Whether to create the root directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to sync every version to disk before it becomes visible.
    pub sync_writes: bool,

    /// Entries buffered ahead of a slow consumer by `source()`.
    pub stream_buffer: usize,
}

impl StoreConfig {
    /// Creates a configuration with default values for the given root.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_if_missing: true,
            sync_writes: true,
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sets whether to create the root directory if missing.
    #[must_use]
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to sync every version to disk.
    #[must_use]
    pub fn sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Sets the source buffer size. Zero is treated as one.
    #[must_use]
    pub fn stream_buffer(mut self, entries: usize) -> Self {
        self.stream_buffer = entries.max(1);
        self
    }
}
