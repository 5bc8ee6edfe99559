//! In-memory blob store.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chronicle_core::storage::{Blob, BlobError, BlobStore, ETag, Precondition};

use crate::{check_precondition, content_etag};

/// Process-local blob store backed by an ordered map.
///
/// Used for development and tests; contents vanish with the process.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, path: &str) -> Result<Option<Blob>, BlobError> {
        let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(path).map(|bytes| Blob {
            etag: content_etag(bytes),
            bytes: bytes.clone(),
        }))
    }

    async fn put_if(
        &self,
        path: &str,
        bytes: Vec<u8>,
        precondition: Precondition,
    ) -> Result<ETag, BlobError> {
        let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        check_precondition(path, blobs.get(path).map(Vec::as_slice), &precondition)?;
        let etag = content_etag(&bytes);
        blobs.insert(path.to_owned(), bytes);
        Ok(etag)
    }

    async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.contains_key(path))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError> {
        let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs
            .range(prefix.to_owned()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(path, _)| path.clone())
            .collect())
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        blobs.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_none_for_unknown_path() {
        let store = InMemoryBlobStore::new();

        assert!(store.get("nope").await.unwrap().is_none());
        assert!(!store.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_then_get_returns_content_and_matching_tag() {
        // Arrange
        let store = InMemoryBlobStore::new();

        // Act
        let tag = store.put("a/b.json", b"{}".to_vec()).await.unwrap();
        let blob = store.get("a/b.json").await.unwrap().unwrap();

        // Assert
        assert_eq!(blob.bytes, b"{}");
        assert_eq!(blob.etag, tag);
    }

    #[tokio::test]
    async fn test_list_only_returns_paths_under_prefix_in_order() {
        // Arrange
        let store = InMemoryBlobStore::new();
        for path in ["u/1/b.json", "u/1/a.json", "u/10/a.json", "u/2/a.json"] {
            store.put(path, Vec::new()).await.unwrap();
        }

        // Act
        let listed = store.list("u/1/").await.unwrap();

        // Assert
        assert_eq!(listed, vec!["u/1/a.json", "u/1/b.json"]);
    }

    #[tokio::test]
    async fn test_if_absent_write_does_not_replace_existing_blob() {
        let store = InMemoryBlobStore::new();
        store.put("k", b"first".to_vec()).await.unwrap();

        let result = store.put_if("k", b"second".to_vec(), Precondition::IfAbsent).await;

        assert!(matches!(result, Err(BlobError::PreconditionFailed { .. })));
        assert_eq!(store.get("k").await.unwrap().unwrap().bytes, b"first");
    }

    #[tokio::test]
    async fn test_if_match_write_fails_after_concurrent_update() {
        // Arrange
        let store = InMemoryBlobStore::new();
        let seen = store.put("ptr", b"v1".to_vec()).await.unwrap();
        store.put("ptr", b"v2".to_vec()).await.unwrap();

        // Act
        let result = store.put_if("ptr", b"v3".to_vec(), Precondition::IfMatch(seen)).await;

        // Assert
        assert!(matches!(result, Err(BlobError::PreconditionFailed { .. })));
        assert_eq!(store.get("ptr").await.unwrap().unwrap().bytes, b"v2");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryBlobStore::new();
        store.put("k", b"x".to_vec()).await.unwrap();

        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();

        assert!(store.is_empty());
    }
}
