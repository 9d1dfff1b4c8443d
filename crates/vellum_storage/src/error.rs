//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document container already exists.
    #[error("document already exists: {doc}")]
    DocumentExists {
        /// The document name.
        doc: String,
    },

    /// The document container does not exist.
    #[error("document not found: {doc}")]
    DocumentNotFound {
        /// The document name.
        doc: String,
    },

    /// A value is already stored under this key.
    #[error("version already exists: {key} in document {doc}")]
    VersionExists {
        /// The document name.
        doc: String,
        /// The version key.
        key: String,
    },

    /// No value is stored under this key.
    #[error("version not found: {key} in document {doc}")]
    VersionNotFound {
        /// The document name.
        doc: String,
        /// The version key.
        key: String,
    },

    /// Another process holds the store lock.
    #[error("storage locked: another process has exclusive access")]
    Locked,
}

impl StorageError {
    pub(crate) fn document_exists(doc: &str) -> Self {
        Self::DocumentExists {
            doc: doc.to_string(),
        }
    }

    pub(crate) fn document_not_found(doc: &str) -> Self {
        Self::DocumentNotFound {
            doc: doc.to_string(),
        }
    }

    pub(crate) fn version_exists(doc: &str, key: &str) -> Self {
        Self::VersionExists {
            doc: doc.to_string(),
            key: key.to_string(),
        }
    }

    pub(crate) fn version_not_found(doc: &str, key: &str) -> Self {
        Self::VersionNotFound {
            doc: doc.to_string(),
            key: key.to_string(),
        }
    }

    /// Returns true if the error reports a missing document or version.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::DocumentNotFound { .. } | StorageError::VersionNotFound { .. }
        )
    }
}
