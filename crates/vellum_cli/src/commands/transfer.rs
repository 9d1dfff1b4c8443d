//! Export, import and replicate commands.
//!
//! Export and import use the framed stream format, so an exported file can
//! be imported into any store, or piped between two `vellum` processes.

use super::{is_stdio, open_store};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, BufReader, BufWriter};
use tracing::info;
use vellum_core::{SinkReport, StoreError, VersionStore};
use vellum_sync_protocol::{read_entries, write_entries, FrameLimits};

/// Writes every version in `store` to `path`, or stdout for `-`.
pub async fn export(store: &VersionStore, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let written = if is_stdio(path) {
        let mut out = BufWriter::new(tokio::io::stdout());
        write_entries(store.source(), &mut out).await?
    } else {
        let mut out = BufWriter::new(File::create(path).await?);
        let written = write_entries(store.source(), &mut out).await?;
        out.get_ref().sync_all().await?;
        written
    };

    info!(path = %path.display(), written, "export complete");
    if !is_stdio(path) {
        println!("exported {written} versions to {}", path.display());
    }
    Ok(())
}

/// Applies every version framed in `path`, or stdin for `-`.
pub async fn import(store: &VersionStore, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let report = if is_stdio(path) {
        apply(store, tokio::io::stdin()).await?
    } else {
        apply(store, File::open(path).await?).await?
    };

    println!("imported {} versions", report.applied);
    Ok(())
}

/// Copies every version in `store` into the store at `target`.
pub async fn replicate(
    store: &VersionStore,
    target: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let replica = open_store(target).await?;
    let report = store.replicate_to(&replica).await?;

    println!("replicated {} versions to {}", report.applied, target.display());
    Ok(())
}

async fn apply<R>(store: &VersionStore, reader: R) -> Result<SinkReport, StoreError>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    store
        .sink(read_entries(BufReader::new(reader), FrameLimits::default()))
        .await
}
