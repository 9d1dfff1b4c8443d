//! Time-ordered stamp keys.
//!
//! Key grammar:
//!
//! ```text
//! root version:  <doc>@<stamp>
//! descendant:    <doc>@<stamp>^<parent-stamp>
//! stamp:         32 lowercase hex digits (UUIDv7)
//! ```
//!
//! Keys are split at the last `@`, so document ids may contain `@` or `^`
//! themselves.

use super::KeyScheme;
use crate::types::{DocId, VersionKey};
use uuid::Uuid;

const DOC_SEPARATOR: char = '@';
const PARENT_SEPARATOR: char = '^';
const STAMP_LEN: usize = 32;

/// Key scheme built on UUIDv7 stamps.
///
/// Stamps are time ordered and carry 74 random bits, so keys minted on
/// different nodes for the same document do not collide. Each descendant key
/// records its parent's stamp.
///
/// # Example
///
/// ```rust
/// use vellum_core::{DocId, KeyScheme, StampScheme};
///
/// let scheme = StampScheme::new();
/// let root = scheme.new_key(&DocId::from("notes"));
/// let next = scheme.update_key(&root).unwrap();
///
/// assert!(scheme.validate(next.as_str()));
/// assert_eq!(scheme.doc_id(&next), Some(DocId::from("notes")));
/// assert!(scheme.descends_from(&next, &root));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StampScheme;

struct ParsedKey<'a> {
    doc: &'a str,
    stamp: &'a str,
    parent: Option<&'a str>,
}

impl StampScheme {
    /// Creates the scheme.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn parse(key: &str) -> Option<ParsedKey<'_>> {
        let (doc, tail) = key.rsplit_once(DOC_SEPARATOR)?;
        if doc.is_empty() {
            return None;
        }

        let (stamp, parent) = match tail.split_once(PARENT_SEPARATOR) {
            Some((stamp, parent)) => (stamp, Some(parent)),
            None => (tail, None),
        };

        if !is_stamp(stamp) || !parent.map_or(true, is_stamp) {
            return None;
        }

        Some(ParsedKey { doc, stamp, parent })
    }
}

impl KeyScheme for StampScheme {
    fn validate(&self, key: &str) -> bool {
        Self::parse(key).is_some()
    }

    fn new_key(&self, doc: &DocId) -> VersionKey {
        VersionKey::new(format!("{doc}{DOC_SEPARATOR}{}", mint()))
    }

    fn update_key(&self, parent: &VersionKey) -> Option<VersionKey> {
        let parsed = Self::parse(parent.as_str())?;
        Some(VersionKey::new(format!(
            "{}{DOC_SEPARATOR}{}{PARENT_SEPARATOR}{}",
            parsed.doc,
            mint(),
            parsed.stamp
        )))
    }

    fn doc_id(&self, key: &VersionKey) -> Option<DocId> {
        Self::parse(key.as_str()).map(|parsed| DocId::from(parsed.doc))
    }

    fn descends_from(&self, key: &VersionKey, parent: &VersionKey) -> bool {
        match (Self::parse(key.as_str()), Self::parse(parent.as_str())) {
            (Some(child), Some(parent)) => {
                child.doc == parent.doc && child.parent == Some(parent.stamp)
            }
            _ => false,
        }
    }
}

fn mint() -> String {
    Uuid::now_v7().simple().to_string()
}

fn is_stamp(s: &str) -> bool {
    s.len() == STAMP_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
