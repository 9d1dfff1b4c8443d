//! File-based storage backend for persistent storage.
//!
//! Directory layout:
//!
//! ```text
//! <root>/
//! ├─ .lock             # Advisory lock for single-process access
//! ├─ .staging/         # Values being written, not yet published
//! ├─ <doc>/            # One directory per document
//! │  ├─ <key>          # One file per version
//! │  └─ <key>
//! └─ <doc>/
//! ```
//!
//! Names starting with `.` are bookkeeping and never listed.

use crate::backend::DocumentBackend;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const LOCK_FILE: &str = ".lock";
const STAGING_DIR: &str = ".staging";

/// A file-based storage backend.
///
/// Each document is a directory under the root and each version is a file
/// inside it. Data survives process restarts.
///
/// # Atomicity
///
/// - Document creation uses a non-recursive `create_dir`, which fails if the
///   directory already exists
/// - Version values are written to a staging file first and published with
///   `hard_link`, which fails if the target name already exists. A version
///   file is therefore either absent or complete.
///
/// # Durability
///
/// When `sync_writes` is enabled (the default), staged values are
/// `sync_all`-ed before they are published.
///
/// # Example
///
/// ```no_run
/// use vellum_storage::{DocumentBackend, FileBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open_with_create_dirs(Path::new("store")).unwrap();
/// backend.create_document("doc").unwrap();
/// backend.insert_version("doc", "k1", b"persistent data").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
    sync_writes: bool,
    _lock_file: File,
}

impl FileBackend {
    /// Opens the store rooted at an existing directory.
    ///
    /// Leftover staging files from an interrupted write are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist
    /// - Another process holds the lock (returns `Locked`)
    /// - I/O errors occur
    pub fn open(root: &Path) -> StorageResult<Self> {
        if !root.is_dir() {
            return Err(StorageError::Io(io::Error::new(
                ErrorKind::NotFound,
                format!("store directory does not exist: {}", root.display()),
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(root.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        let staging = root.join(STAGING_DIR);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir(&staging)?;

        debug!(root = %root.display(), "opened file backend");

        Ok(Self {
            root: root.to_path_buf(),
            sync_writes: true,
            _lock_file: lock_file,
        })
    }

    /// Opens the store, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the store cannot
    /// be opened.
    pub fn open_with_create_dirs(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root)?;
        Self::open(root)
    }

    /// Sets whether staged values are synced to disk before publishing.
    #[must_use]
    pub fn with_sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Returns the root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn doc_path(&self, doc: &str) -> StorageResult<PathBuf> {
        Ok(self.root.join(component(doc)?))
    }

    fn version_path(&self, doc: &str, key: &str) -> StorageResult<PathBuf> {
        Ok(self.doc_path(doc)?.join(component(key)?))
    }

    fn stage(&self, value: &[u8]) -> StorageResult<PathBuf> {
        let path = self
            .root
            .join(STAGING_DIR)
            .join(Uuid::new_v4().simple().to_string());

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(value)?;
        if self.sync_writes {
            file.sync_all()?;
        }

        Ok(path)
    }
}

impl DocumentBackend for FileBackend {
    fn contains_document(&self, doc: &str) -> StorageResult<bool> {
        Ok(self.doc_path(doc)?.is_dir())
    }

    fn create_document(&self, doc: &str) -> StorageResult<()> {
        match fs::create_dir(self.doc_path(doc)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StorageError::document_exists(doc))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn ensure_document(&self, doc: &str) -> StorageResult<()> {
        match fs::create_dir(self.doc_path(doc)?) {
            Err(e) if e.kind() != ErrorKind::AlreadyExists => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn insert_version(&self, doc: &str, key: &str, value: &[u8]) -> StorageResult<()> {
        let target = self.version_path(doc, key)?;
        if !self.doc_path(doc)?.is_dir() {
            return Err(StorageError::document_not_found(doc));
        }

        let staged = self.stage(value)?;
        let published = fs::hard_link(&staged, &target);
        if let Err(e) = fs::remove_file(&staged) {
            warn!(path = %staged.display(), error = %e, "failed to remove staged value");
        }

        match published {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StorageError::version_exists(doc, key))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::document_not_found(doc)),
            Err(e) => Err(e.into()),
        }
    }

    fn read_version(&self, doc: &str, key: &str) -> StorageResult<Vec<u8>> {
        match fs::read(self.version_path(doc, key)?) {
            Ok(value) => Ok(value),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::version_not_found(doc, key))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn contains_version(&self, doc: &str, key: &str) -> StorageResult<bool> {
        Ok(self.version_path(doc, key)?.is_file())
    }

    fn remove_version(&self, doc: &str, key: &str) -> StorageResult<()> {
        match fs::remove_file(self.version_path(doc, key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::version_not_found(doc, key))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_documents(&self) -> StorageResult<Vec<String>> {
        list_names(&self.root, true)
    }

    fn list_versions(&self, doc: &str) -> StorageResult<Vec<String>> {
        match list_names(&self.doc_path(doc)?, false) {
            Err(StorageError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::document_not_found(doc))
            }
            other => other,
        }
    }
}

/// Validates that `name` maps to exactly one path component.
fn component(name: &str) -> StorageResult<&str> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(StorageError::Io(io::Error::new(
            ErrorKind::InvalidInput,
            format!("not a valid storage name: {name:?}"),
        )));
    }
    Ok(name)
}

/// Lists visible entries of `dir`, keeping directories or files only.
fn list_names(dir: &Path, directories: bool) -> StorageResult<Vec<String>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() != directories {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) if name.starts_with('.') => {}
            Ok(name) => names.push(name),
            Err(raw) => warn!(?raw, dir = %dir.display(), "skipping non UTF-8 entry"),
        }
    }

    names.sort();
    Ok(names)
}
