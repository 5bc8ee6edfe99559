//! Test blob stores: instrumented and failing `BlobStore` implementations.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chronicle_blob_store::InMemoryBlobStore;
use chronicle_core::storage::{Blob, BlobError, BlobStore, ETag, Precondition};

/// An in-memory blob store that records the path of every attempted write.
///
/// Use it to assert that an operation performed no writes, or wrote in a
/// particular order.
#[derive(Debug, Default)]
pub struct RecordingBlobStore {
    inner: InMemoryBlobStore,
    writes: Mutex<Vec<String>>,
}

impl RecordingBlobStore {
    /// Create an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths of every attempted `put_if`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    /// The underlying store, for seeding or inspecting state directly.
    #[must_use]
    pub fn inner(&self) -> &InMemoryBlobStore {
        &self.inner
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn get(&self, path: &str) -> Result<Option<Blob>, BlobError> {
        self.inner.get(path).await
    }

    async fn put_if(
        &self,
        path: &str,
        bytes: Vec<u8>,
        precondition: Precondition,
    ) -> Result<ETag, BlobError> {
        self.writes.lock().unwrap().push(path.to_owned());
        self.inner.put_if(path, bytes, precondition).await
    }

    async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        self.inner.exists(path).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError> {
        self.inner.list(prefix).await
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        self.inner.delete(path).await
    }
}

/// A blob store whose writes fail for any path ending in a configured
/// suffix until [`FlakyBlobStore::heal`] is called. Reads and other writes go
/// to an in-memory store.
///
/// `FlakyBlobStore::failing_writes_to("current.json")` reproduces a commit
/// whose version write succeeds but whose pointer write fails.
#[derive(Debug)]
pub struct FlakyBlobStore {
    inner: RecordingBlobStore,
    failing_suffix: String,
    healed: AtomicBool,
}

impl FlakyBlobStore {
    /// Create a store that rejects writes to paths ending in `suffix`.
    #[must_use]
    pub fn failing_writes_to(suffix: impl Into<String>) -> Self {
        Self {
            inner: RecordingBlobStore::new(),
            failing_suffix: suffix.into(),
            healed: AtomicBool::new(false),
        }
    }

    /// Stop failing writes from now on.
    pub fn heal(&self) {
        self.healed.store(true, Ordering::SeqCst);
    }

    /// Paths of every attempted write, including rejected ones.
    pub fn writes(&self) -> Vec<String> {
        self.inner.writes()
    }

    /// The underlying store.
    #[must_use]
    pub fn inner(&self) -> &InMemoryBlobStore {
        self.inner.inner()
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn get(&self, path: &str) -> Result<Option<Blob>, BlobError> {
        self.inner.get(path).await
    }

    async fn put_if(
        &self,
        path: &str,
        bytes: Vec<u8>,
        precondition: Precondition,
    ) -> Result<ETag, BlobError> {
        if !self.healed.load(Ordering::SeqCst) && path.ends_with(&self.failing_suffix) {
            self.inner.writes.lock().unwrap().push(path.to_owned());
            return Err(BlobError::Io {
                path: path.to_owned(),
                message: "simulated write failure".into(),
            });
        }
        self.inner.put_if(path, bytes, precondition).await
    }

    async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        self.inner.exists(path).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError> {
        self.inner.list(prefix).await
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        self.inner.delete(path).await
    }
}

/// A blob store that fails every operation with an I/O error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingBlobStore;

fn connection_refused(path: &str) -> BlobError {
    BlobError::Io {
        path: path.to_owned(),
        message: "connection refused".into(),
    }
}

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn get(&self, path: &str) -> Result<Option<Blob>, BlobError> {
        Err(connection_refused(path))
    }

    async fn put_if(
        &self,
        path: &str,
        _bytes: Vec<u8>,
        _precondition: Precondition,
    ) -> Result<ETag, BlobError> {
        Err(connection_refused(path))
    }

    async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        Err(connection_refused(path))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError> {
        Err(connection_refused(prefix))
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        Err(connection_refused(path))
    }
}
