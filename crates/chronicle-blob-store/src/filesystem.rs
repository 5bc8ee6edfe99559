//! Filesystem-backed blob store.
//!
//! Blob paths map onto files below a root directory. Writes go to a sibling
//! temporary file that is renamed into place, so readers never observe a
//! partially written blob. Conditional writes are serialized through a
//! process-wide lock; the store assumes it is the only writer under `root`.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chronicle_core::storage::{Blob, BlobError, BlobStore, ETag, Precondition};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{check_precondition, content_etag};

const PARTIAL_SUFFIX: &str = ".partial";

/// Blob store persisting each blob as a file below `root`.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    write_lock: Mutex<()>,
    temp_counter: AtomicU64,
}

impl FsBlobStore {
    /// Creates a store rooted at `root`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
            temp_counter: AtomicU64::new(0),
        }
    }

    /// The directory blobs are stored under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        let invalid = |reason: &str| BlobError::InvalidPath {
            path: path.to_owned(),
            reason: reason.to_owned(),
        };

        if path.is_empty() {
            return Err(invalid("path is empty"));
        }
        if path.starts_with('/') {
            return Err(invalid("path must be relative"));
        }
        if path.split('/').any(str::is_empty) {
            return Err(invalid("path contains an empty segment"));
        }
        let relative = Path::new(path);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(invalid("path contains a relative or root component"));
        }
        if path.ends_with(PARTIAL_SUFFIX) {
            return Err(invalid("path uses a reserved suffix"));
        }
        Ok(self.root.join(relative))
    }

    fn temp_path_for(&self, target: &Path) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        let mut name = target
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(format!(".{}.{n}{PARTIAL_SUFFIX}", std::process::id()));
        target.with_file_name(name)
    }

    async fn read_existing(&self, path: &str, file: &Path) -> Result<Option<Vec<u8>>, BlobError> {
        match fs::read(file).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(path, &e)),
        }
    }

    async fn write_atomically(
        &self,
        path: &str,
        file: &Path,
        bytes: &[u8],
    ) -> Result<(), BlobError> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(path, &e))?;
        }
        let temp = self.temp_path_for(file);
        if let Err(e) = fs::write(&temp, bytes).await {
            let _ = fs::remove_file(&temp).await;
            return Err(io_error(path, &e));
        }
        if let Err(e) = fs::rename(&temp, file).await {
            let _ = fs::remove_file(&temp).await;
            return Err(io_error(path, &e));
        }
        Ok(())
    }
}

fn io_error(path: &str, err: &io::Error) -> BlobError {
    BlobError::Io {
        path: path.to_owned(),
        message: err.to_string(),
    }
}

/// Directory to start listing from: the deepest directory fully named by
/// `prefix`.
fn listing_base(prefix: &str) -> &str {
    prefix.rfind('/').map_or("", |i| &prefix[..i])
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, path: &str) -> Result<Option<Blob>, BlobError> {
        let file = self.resolve(path)?;
        Ok(self.read_existing(path, &file).await?.map(|bytes| Blob {
            etag: content_etag(&bytes),
            bytes,
        }))
    }

    async fn put_if(
        &self,
        path: &str,
        bytes: Vec<u8>,
        precondition: Precondition,
    ) -> Result<ETag, BlobError> {
        let file = self.resolve(path)?;
        let _guard = self.write_lock.lock().await;

        if precondition != Precondition::None {
            let existing = self.read_existing(path, &file).await?;
            check_precondition(path, existing.as_deref(), &precondition)?;
        }
        self.write_atomically(path, &file, &bytes).await?;
        debug!(path, bytes = bytes.len(), "blob written");
        Ok(content_etag(&bytes))
    }

    async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        let file = self.resolve(path)?;
        match fs::metadata(&file).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(path, &e)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError> {
        let base = listing_base(prefix);
        let mut pending = vec![(
            if base.is_empty() {
                self.root.clone()
            } else {
                self.resolve(base)?
            },
            base.to_owned(),
        )];
        let mut found = Vec::new();

        while let Some((dir, logical)) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(io_error(prefix, &e)),
            };
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| io_error(prefix, &e))?
            {
                let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                    continue;
                };
                let child = if logical.is_empty() {
                    name.clone()
                } else {
                    format!("{logical}/{name}")
                };
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| io_error(&child, &e))?;
                if file_type.is_dir() {
                    if child.starts_with(prefix) || prefix.starts_with(&format!("{child}/")) {
                        pending.push((entry.path(), child));
                    }
                } else if file_type.is_file()
                    && !name.ends_with(PARTIAL_SUFFIX)
                    && child.starts_with(prefix)
                {
                    found.push(child);
                }
            }
        }

        found.sort();
        Ok(found)
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        let file = self.resolve(path)?;
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(path, &e)),
        }
    }
}
