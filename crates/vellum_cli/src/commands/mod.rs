//! CLI command implementations.

pub mod crud;
pub mod query;
pub mod transfer;

use std::path::Path;
use tokio::io::AsyncReadExt;
use vellum_core::{StoreConfig, StoreResult, VersionStore};

/// Argument value that stands for stdin or stdout.
pub const STDIO: &str = "-";

/// Opens the store at `path`, creating it if missing.
pub async fn open_store(path: &Path) -> StoreResult<VersionStore> {
    VersionStore::open(StoreConfig::new(path)).await
}

/// Resolves a value argument, reading all of stdin for `-`.
pub async fn value_bytes(arg: &str) -> std::io::Result<Vec<u8>> {
    if arg == STDIO {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        Ok(buf)
    } else {
        Ok(arg.as_bytes().to_vec())
    }
}

/// Returns true when a file argument means stdin or stdout.
pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO
}
