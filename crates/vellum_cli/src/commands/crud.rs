//! Version chain commands.

use super::value_bytes;
use std::io::Write;
use tracing::debug;
use vellum_core::{VersionKey, VersionStore};

/// Creates document `doc` and prints the key of its first version.
pub async fn create(
    store: &VersionStore,
    doc: String,
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let value = value_bytes(value).await?;
    let created = store.create(doc, value).await?;
    println!("{}", created.key);
    Ok(())
}

/// Writes the raw value stored under `key` to stdout.
pub async fn read(store: &VersionStore, key: String) -> Result<(), Box<dyn std::error::Error>> {
    let value = store.read(&VersionKey::from(key)).await?;

    let mut out = std::io::stdout().lock();
    out.write_all(&value)?;
    out.flush()?;
    Ok(())
}

/// Appends a version after `key` and prints the new key.
pub async fn update(
    store: &VersionStore,
    key: String,
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let value = value_bytes(value).await?;
    let updated = store.update(&VersionKey::from(key), value).await?;
    debug!(prev = %updated.prev, key = %updated.key, "version appended");
    println!("{}", updated.key);
    Ok(())
}

/// Deletes the version stored under `key`.
pub async fn del(store: &VersionStore, key: String) -> Result<(), Box<dyn std::error::Error>> {
    let key = VersionKey::from(key);
    store.del(&key).await?;
    println!("deleted {key}");
    Ok(())
}
