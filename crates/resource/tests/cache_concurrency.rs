//! Concurrent access to the resource cache.
//!
//! Verifies:
//! 1. N concurrent callers for one key run the factory exactly once and all
//!    receive the same instance.
//! 2. A slow creation for one key does not hold up another key.
//! 3. A failed creation does not poison the key.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use testbed_codec::PropertyMap;
use testbed_resource::{BoxError, Error, Resource, ResourceCache, ResourceKey, ScopeId};
use tokio::task::JoinSet;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Container {
    id: u32,
}

impl Resource for Container {}

fn key(name: &str, image: &str) -> ResourceKey {
    let mut props = PropertyMap::new();
    props.insert("image".into(), image.into());
    ResourceKey::new("containers", name, &props)
}

// ---------------------------------------------------------------------------
// Single creation
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_creation() {
    let cache = Arc::new(ResourceCache::new());
    let created = Arc::new(AtomicU32::new(0));
    let mut set = JoinSet::new();

    for _ in 0..32 {
        let cache = Arc::clone(&cache);
        let created = Arc::clone(&created);
        set.spawn(async move {
            cache
                .get_or_create(key("postgres", "postgres:16"), &ScopeId::default(), || async move {
                    let id = created.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, BoxError>(Container { id })
                })
                .await
                .expect("creation should succeed")
        });
    }

    let mut instances = Vec::new();
    while let Some(result) = set.join_next().await {
        instances.push(result.expect("task panicked"));
    }

    assert_eq!(created.load(Ordering::SeqCst), 1, "factory must run once");
    let first = &instances[0];
    assert!(instances.iter().all(|i| Arc::ptr_eq(i, first)));
    assert_eq!(first.id, 0);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn different_properties_are_isolated() {
    let cache = ResourceCache::new();
    let scope = ScopeId::default();

    let sixteen = cache
        .get_or_create(key("postgres", "postgres:16"), &scope, || async {
            Ok::<_, BoxError>(Container { id: 16 })
        })
        .await
        .unwrap();
    let fifteen = cache
        .get_or_create(key("postgres", "postgres:15"), &scope, || async {
            Ok::<_, BoxError>(Container { id: 15 })
        })
        .await
        .unwrap();

    assert!(!Arc::ptr_eq(&sixteen, &fifteen));
    assert_eq!((sixteen.id, fifteen.id), (16, 15));
    assert_eq!(cache.len(), 2);
}

// ---------------------------------------------------------------------------
// Independence across keys
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_key_does_not_block_other_keys() {
    let cache = Arc::new(ResourceCache::new());
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

    let slow = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .get_or_create(key("slow", "a"), &ScopeId::default(), || async move {
                    let _ = release_rx.await;
                    Ok::<_, BoxError>(Container { id: 1 })
                })
                .await
        })
    };

    // The slow factory is parked; a different key must still resolve.
    let fast = tokio::time::timeout(
        Duration::from_secs(2),
        cache.get_or_create(key("fast", "b"), &ScopeId::default(), || async {
            Ok::<_, BoxError>(Container { id: 2 })
        }),
    )
    .await
    .expect("unrelated key was blocked")
    .unwrap();
    assert_eq!(fast.id, 2);

    release_tx.send(()).unwrap();
    let slow = slow.await.unwrap().unwrap();
    assert_eq!(slow.id, 1);
}

// ---------------------------------------------------------------------------
// Failure does not poison
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_creation_leaves_key_retryable() {
    let cache = ResourceCache::new();
    let scope = ScopeId::default();

    let err = cache
        .get_or_create(key("flaky", "x"), &scope, || async {
            Err::<Container, BoxError>("image pull failed".into())
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Creation { .. }));
    assert!(err.to_string().contains("image pull failed"));
    assert!(cache.is_empty());

    let ok = cache
        .get_or_create(key("flaky", "x"), &scope, || async {
            Ok::<_, BoxError>(Container { id: 7 })
        })
        .await
        .unwrap();
    assert_eq!(ok.id, 7);
    assert_eq!(cache.stats().failures, 1);
    assert_eq!(cache.stats().creations, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn waiter_retries_after_leader_fails() {
    let cache = Arc::new(ResourceCache::new());
    let attempts = Arc::new(AtomicU32::new(0));

    let mut set = JoinSet::new();
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        let attempts = Arc::clone(&attempts);
        set.spawn(async move {
            cache
                .get_or_create(key("flaky", "y"), &ScopeId::default(), || async move {
                    let n = attempts.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    if n == 0 {
                        Err::<Container, BoxError>("first attempt fails".into())
                    } else {
                        Ok(Container { id: n })
                    }
                })
                .await
                .map(|c| c.id)
        });
    }

    let mut ok = Vec::new();
    let mut failed = 0;
    while let Some(result) = set.join_next().await {
        match result.unwrap() {
            Ok(id) => ok.push(id),
            Err(_) => failed += 1,
        }
    }

    assert_eq!(failed, 1, "only the first attempt fails");
    assert_eq!(attempts.load(Ordering::SeqCst), 2, "one retry after failure");
    assert!(ok.iter().all(|id| *id == 1));
}
