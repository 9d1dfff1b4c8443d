//! Error types for Vellum core.

use thiserror::Error;
use vellum_storage::StorageError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store and replication operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document id cannot name a document.
    #[error("invalid document id: {id:?}")]
    InvalidId {
        /// The rejected id.
        id: String,
    },

    /// The key is not a well-formed version key.
    #[error("invalid version key: {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// The document already has versions.
    #[error("document already exists: {doc}")]
    DocExists {
        /// The document id.
        doc: String,
    },

    /// A version with this key is already stored.
    #[error("version already exists: {key}")]
    VersionExists {
        /// The version key.
        key: String,
    },

    /// The requested document or version does not exist.
    #[error("not found: {target}")]
    NotFound {
        /// What was looked up.
        target: String,
    },

    /// Storage backend error.
    #[error("storage error: {0}")]
    Backend(StorageError),

    /// The entry stream failed before reaching the store.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// A blocking storage task panicked or was cancelled.
    #[error("storage task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Error categories callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`StoreError::InvalidId`].
    InvalidId,
    /// See [`StoreError::InvalidKey`].
    InvalidKey,
    /// See [`StoreError::DocExists`].
    DocExists,
    /// See [`StoreError::VersionExists`].
    VersionExists,
    /// See [`StoreError::NotFound`].
    NotFound,
    /// Backend or blocking task failure.
    BackendIo,
    /// See [`StoreError::Transport`].
    Transport,
}

impl StoreError {
    /// Creates an invalid id error.
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId { id: id.into() }
    }

    /// Creates an invalid key error.
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into() }
    }

    /// Creates a not found error.
    pub fn not_found(target: impl Into<String>) -> Self {
        Self::NotFound {
            target: target.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidId { .. } => ErrorKind::InvalidId,
            StoreError::InvalidKey { .. } => ErrorKind::InvalidKey,
            StoreError::DocExists { .. } => ErrorKind::DocExists,
            StoreError::VersionExists { .. } => ErrorKind::VersionExists,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Backend(_) | StoreError::TaskFailed(_) => ErrorKind::BackendIo,
            StoreError::Transport { .. } => ErrorKind::Transport,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DocumentExists { doc } => StoreError::DocExists { doc },
            StorageError::VersionExists { key, .. } => StoreError::VersionExists { key },
            StorageError::DocumentNotFound { doc } => StoreError::not_found(format!("document {doc}")),
            StorageError::VersionNotFound { key, .. } => {
                StoreError::not_found(format!("version {key}"))
            }
            other => StoreError::Backend(other),
        }
    }
}
