//! Core type definitions for Vellum.

use bytes::Bytes;
use std::fmt;

/// Longest accepted document id, in bytes.
///
/// Keeps every version key derived from the id within common file-name
/// limits (255 bytes).
pub const MAX_DOC_ID_LEN: usize = 180;

/// Caller-supplied identity of a document.
///
/// Documents have no value of their own; they exist through their versions.
/// Numeric ids are stored in their decimal form, so `DocId::from(7u64)` and
/// `DocId::from("7")` name the same document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocId(String);

impl DocId {
    /// Creates a document id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns true if the id can name a document.
    ///
    /// Ids must be non-empty, at most [`MAX_DOC_ID_LEN`] bytes, must not
    /// start with `.`, and must not contain `/`, `\` or NUL.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let id = self.0.as_str();
        !id.is_empty()
            && id.len() <= MAX_DOC_ID_LEN
            && !id.starts_with('.')
            && !id.contains(['/', '\\', '\0'])
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for DocId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for DocId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for DocId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// Opaque identifier of one version, minted by a [`crate::KeyScheme`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionKey(String);

impl VersionKey {
    /// Wraps a raw key. No validation is performed.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VersionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VersionKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for VersionKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A single `(key, value)` pair as carried by replication streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Version key.
    pub key: VersionKey,
    /// Stored value, never interpreted by the store.
    pub value: Bytes,
}

impl Entry {
    /// Creates an entry.
    pub fn new(key: impl Into<VersionKey>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Result of a successful `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    /// Key of the document's first version.
    pub key: VersionKey,
    /// The stored value.
    pub value: Bytes,
}

/// Result of a successful `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Updated {
    /// Key of the new version.
    pub key: VersionKey,
    /// Key the new version descends from.
    pub prev: VersionKey,
    /// The stored value.
    pub value: Bytes,
}

/// Summary of a completed sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    /// Number of entries committed.
    pub applied: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_use_decimal_form() {
        assert_eq!(DocId::from(42u64), DocId::from("42"));
        assert_eq!(DocId::from(-7i64).as_str(), "-7");
        assert_eq!(DocId::from(7), DocId::from(7u64));
        assert_eq!(DocId::from(7u32).as_str(), "7");
    }

    #[test]
    fn well_formed_ids() {
        assert!(DocId::from("doc1").is_well_formed());
        assert!(DocId::from("with space@and^marks").is_well_formed());
        assert!(!DocId::from("").is_well_formed());
        assert!(!DocId::from(".hidden").is_well_formed());
        assert!(!DocId::from("a/b").is_well_formed());
        assert!(!DocId::from("a\\b").is_well_formed());
        assert!(!DocId::from("a\0b").is_well_formed());
        assert!(!DocId::new("x".repeat(MAX_DOC_ID_LEN + 1)).is_well_formed());
    }

    #[test]
    fn entry_from_parts() {
        let entry = Entry::new("k", b"v".to_vec());
        assert_eq!(entry.key.as_str(), "k");
        assert_eq!(&entry.value[..], b"v");
    }
}
