//! Behaviour every `BlobStore` implementation must share.

use std::sync::Arc;

use chronicle_blob_store::{FsBlobStore, InMemoryBlobStore, content_etag};
use chronicle_core::storage::{BlobError, BlobStore, Precondition};

async fn check_round_trip(store: &dyn BlobStore) {
    let tag = store
        .put("users/alice/story-root/root/current.json", b"{\"version_id\":\"v1\"}".to_vec())
        .await
        .unwrap();

    let blob = store
        .get("users/alice/story-root/root/current.json")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(blob.bytes, b"{\"version_id\":\"v1\"}");
    assert_eq!(blob.etag, tag);
    assert_eq!(tag, content_etag(&blob.bytes));
}

async fn check_list_is_prefix_scoped_and_sorted(store: &dyn BlobStore) {
    for path in [
        "users/alice/story-root/root/versions/b.json",
        "users/alice/story-root/root/versions/a.json",
        "users/alice/story-root/root/current.json",
        "users/alice2/story-root/root/versions/c.json",
        "users/bob/story-root/root/versions/d.json",
    ] {
        store.put(path, b"{}".to_vec()).await.unwrap();
    }

    let versions = store
        .list("users/alice/story-root/root/versions/")
        .await
        .unwrap();
    let partial = store.list("users/alice").await.unwrap();

    assert_eq!(
        versions,
        vec![
            "users/alice/story-root/root/versions/a.json",
            "users/alice/story-root/root/versions/b.json",
        ]
    );
    assert_eq!(partial.len(), 4);
    assert!(store.list("users/carol/").await.unwrap().is_empty());
}

async fn check_preconditions(store: &dyn BlobStore) {
    store
        .put_if("v/1.json", b"one".to_vec(), Precondition::IfAbsent)
        .await
        .unwrap();
    let again = store
        .put_if("v/1.json", b"uno".to_vec(), Precondition::IfAbsent)
        .await;
    assert!(matches!(again, Err(BlobError::PreconditionFailed { .. })));

    let seen = store.get("v/1.json").await.unwrap().unwrap().etag;
    let updated = store
        .put_if("v/1.json", b"two".to_vec(), Precondition::IfMatch(seen.clone()))
        .await
        .unwrap();
    let stale = store
        .put_if("v/1.json", b"three".to_vec(), Precondition::IfMatch(seen))
        .await;

    assert!(matches!(stale, Err(BlobError::PreconditionFailed { .. })));
    assert_eq!(store.get("v/1.json").await.unwrap().unwrap().etag, updated);

    let missing = store
        .put_if("v/2.json", b"x".to_vec(), Precondition::IfMatch(updated))
        .await;
    assert!(matches!(missing, Err(BlobError::PreconditionFailed { .. })));
    assert!(!store.exists("v/2.json").await.unwrap());
}

async fn check_delete(store: &dyn BlobStore) {
    store.put("d/x.json", b"x".to_vec()).await.unwrap();
    assert!(store.exists("d/x.json").await.unwrap());

    store.delete("d/x.json").await.unwrap();
    store.delete("d/x.json").await.unwrap();

    assert!(!store.exists("d/x.json").await.unwrap());
    assert!(store.get("d/x.json").await.unwrap().is_none());
}

async fn check_concurrent_if_absent_has_single_winner(store: Arc<dyn BlobStore>) {
    let mut handles = Vec::new();
    for i in 0..8u8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .put_if("race/slot.json", vec![i], Precondition::IfAbsent)
                .await
                .is_ok()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }

    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_in_memory_store_round_trips_blobs() {
    check_round_trip(&InMemoryBlobStore::new()).await;
}

#[tokio::test]
async fn test_in_memory_store_lists_by_prefix() {
    check_list_is_prefix_scoped_and_sorted(&InMemoryBlobStore::new()).await;
}

#[tokio::test]
async fn test_in_memory_store_honours_preconditions() {
    check_preconditions(&InMemoryBlobStore::new()).await;
}

#[tokio::test]
async fn test_in_memory_store_deletes_idempotently() {
    check_delete(&InMemoryBlobStore::new()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_in_memory_store_serializes_conditional_creates() {
    check_concurrent_if_absent_has_single_winner(Arc::new(InMemoryBlobStore::new())).await;
}

#[tokio::test]
async fn test_filesystem_store_round_trips_blobs() {
    let dir = tempfile::tempdir().unwrap();
    check_round_trip(&FsBlobStore::new(dir.path())).await;
}

#[tokio::test]
async fn test_filesystem_store_lists_by_prefix() {
    let dir = tempfile::tempdir().unwrap();
    check_list_is_prefix_scoped_and_sorted(&FsBlobStore::new(dir.path())).await;
}

#[tokio::test]
async fn test_filesystem_store_honours_preconditions() {
    let dir = tempfile::tempdir().unwrap();
    check_preconditions(&FsBlobStore::new(dir.path())).await;
}

#[tokio::test]
async fn test_filesystem_store_deletes_idempotently() {
    let dir = tempfile::tempdir().unwrap();
    check_delete(&FsBlobStore::new(dir.path())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_filesystem_store_serializes_conditional_creates() {
    let dir = tempfile::tempdir().unwrap();
    check_concurrent_if_absent_has_single_winner(Arc::new(FsBlobStore::new(dir.path()))).await;
}

#[tokio::test]
async fn test_filesystem_store_reads_what_a_previous_instance_wrote() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    FsBlobStore::new(dir.path())
        .put("users/alice/world-state/world/current.json", b"{}".to_vec())
        .await
        .unwrap();

    // Act
    let reopened = FsBlobStore::new(dir.path());
    let blob = reopened
        .get("users/alice/world-state/world/current.json")
        .await
        .unwrap();

    // Assert
    assert_eq!(blob.unwrap().bytes, b"{}");
}

#[tokio::test]
async fn test_filesystem_store_lists_nothing_when_root_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsBlobStore::new(dir.path().join("not-created"));

    assert!(store.list("users/").await.unwrap().is_empty());
    assert!(store.get("users/a.json").await.unwrap().is_none());
}
