//! Version key schemes.
//!
//! The store never looks inside a version key. Everything it needs (minting,
//! validation, recovering the owning document) goes through a [`KeyScheme`],
//! so alternative schemes can be substituted without touching store logic.

mod stamp;

pub use stamp::StampScheme;

use crate::types::{DocId, VersionKey};
use std::fmt;

/// Strategy for minting and interpreting version keys.
///
/// # Contract
///
/// - Keys minted for one document never collide with each other
/// - [`KeyScheme::doc_id`] resolves every valid key to exactly one document
/// - [`KeyScheme::update_key`] records the parent it descends from
///
/// The store relies on this contract but still refuses to overwrite an
/// existing key, so a scheme bug surfaces as `VersionExists` rather than as
/// lost data.
pub trait KeyScheme: Send + Sync + fmt::Debug {
    /// Returns true if `key` is a well-formed version key.
    fn validate(&self, key: &str) -> bool;

    /// Mints the key for the first version of `doc`.
    fn new_key(&self, doc: &DocId) -> VersionKey;

    /// Mints the key of a new version descending from `parent`.
    ///
    /// Returns `None` if `parent` is not a valid key.
    fn update_key(&self, parent: &VersionKey) -> Option<VersionKey>;

    /// Recovers the owning document of `key`.
    ///
    /// Returns `None` if `key` is not a valid key.
    fn doc_id(&self, key: &VersionKey) -> Option<DocId>;

    /// Returns true if `key` was minted by `update_key(parent)`.
    ///
    /// Schemes that cannot trace parents return `false`.
    fn descends_from(&self, _key: &VersionKey, _parent: &VersionKey) -> bool {
        false
    }
}
