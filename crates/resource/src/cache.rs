//! Resource cache: single creation per key, scoped eviction.
//!
//! Every key maps to a slot holding a `tokio::sync::OnceCell`. The cell
//! linearizes creation: concurrent callers for one key wait for a single
//! factory invocation, while callers for other keys never touch that slot.
//!
//! A factory failure leaves the cell empty. The key is not poisoned; the
//! next caller (including one that was already waiting) runs its own
//! factory. An empty slot nobody else holds is dropped from the map.
//!
//! Ownership is 1:1: a resource belongs to the scope of the caller that
//! created it. Callers from other scopes may share the instance, but only
//! closing the owning scope (or closing everything) destroys it.
//!
//! Closing only evicts populated slots. A creation still running when a
//! close happens completes and lands in the cache.

use std::any::Any;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::error::{BoxError, Error, Result};
use crate::key::ResourceKey;
use crate::resource::Resource;
use crate::scope::ScopeId;

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

struct Entry {
    instance: Arc<dyn Any + Send + Sync>,
    hook: Arc<dyn Resource>,
    owner: ScopeId,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Slot {
    cell: OnceCell<Entry>,
}

impl Slot {
    fn entry(&self) -> Option<&Entry> {
        self.cell.get()
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls to `get_or_create`.
    pub requests: u64,
    /// Successful factory invocations.
    pub creations: u64,
    /// Failed factory invocations.
    pub failures: u64,
    /// Resources destroyed by a close.
    pub evictions: u64,
}

#[derive(Default)]
struct Counters {
    requests: AtomicU64,
    creations: AtomicU64,
    failures: AtomicU64,
    evictions: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// ResourceCache
// ---------------------------------------------------------------------------

/// Process-wide table of expensive resources.
///
/// Owned by whoever hosts the resolvers (normally the server state) and
/// shared behind an `Arc`.
#[derive(Default)]
pub struct ResourceCache {
    slots: DashMap<ResourceKey, Arc<Slot>>,
    counters: Counters,
}

impl ResourceCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the resource cached under `key`, creating it with `factory`
    /// on a miss.
    ///
    /// The factory runs at most once at a time per key, and only while the
    /// key is unpopulated. A newly created resource is owned by `scope`.
    pub async fn get_or_create<R, F, Fut, E>(
        &self,
        key: ResourceKey,
        scope: &ScopeId,
        factory: F,
    ) -> Result<Arc<R>>
    where
        R: Resource,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<R, E>>,
        E: Into<BoxError>,
    {
        Counters::bump(&self.counters.requests);

        let slot = self.slot(&key);

        let key_ref = &key;
        let created = slot
            .cell
            .get_or_try_init(move || async move {
                tracing::info!(key = %key_ref, scope = %scope, "Creating resource");
                match factory().await {
                    Ok(resource) => {
                        Counters::bump(&self.counters.creations);
                        let resource = Arc::new(resource);
                        tracing::debug!(
                            key = %key_ref,
                            resource = %resource.describe(),
                            "Resource created"
                        );
                        Ok(Entry {
                            instance: Arc::clone(&resource) as Arc<dyn Any + Send + Sync>,
                            hook: resource,
                            owner: scope.clone(),
                            created_at: Utc::now(),
                        })
                    }
                    Err(e) => {
                        Counters::bump(&self.counters.failures);
                        let source: BoxError = e.into();
                        tracing::warn!(key = %key_ref, error = %source, "Resource creation failed");
                        Err(Error::Creation {
                            key: key_ref.to_string(),
                            source,
                        })
                    }
                }
            })
            .await;
        let entry = match created {
            Ok(entry) => entry,
            Err(error) => {
                self.prune(&key, &slot);
                return Err(error);
            }
        };

        Arc::clone(&entry.instance)
            .downcast::<R>()
            .map_err(|_| Error::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<R>(),
            })
    }

    /// The slot for `key`. Hits only take the shard read lock; the Arc is
    /// cloned so no shard lock is held across an await.
    fn slot(&self, key: &ResourceKey) -> Arc<Slot> {
        if let Some(slot) = self.slots.get(key) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.slots.entry(key.clone()).or_default().value())
    }

    /// Drop `slot` after a failed creation unless it got populated or
    /// another caller still holds it (a queued waiter retries on it).
    /// `remove_if` holds the shard write lock, so no new holder can appear
    /// while the count is checked.
    fn prune(&self, key: &ResourceKey, slot: &Arc<Slot>) {
        self.slots.remove_if(key, |_, current| {
            Arc::ptr_eq(current, slot)
                && Arc::strong_count(current) == 2
                && !current.cell.initialized()
        });
    }

    /// Destroy every resource owned by `scope`.
    ///
    /// Returns whether anything was destroyed. Shutdown failures are logged
    /// and do not stop the remaining resources from being destroyed.
    pub async fn close_scope(&self, scope: &ScopeId) -> bool {
        tracing::debug!(%scope, "Closing scope");
        self.evict(|entry| entry.owner == *scope).await
    }

    /// Destroy every resource regardless of scope.
    ///
    /// Returns whether anything was destroyed; an empty cache yields `false`.
    pub async fn close_all(&self) -> bool {
        tracing::debug!("Closing all resources");
        self.evict(|_| true).await
    }

    async fn evict(&self, matches: impl Fn(&Entry) -> bool) -> bool {
        let candidates: Vec<(ResourceKey, Arc<Slot>)> = self
            .slots
            .iter()
            .filter(|item| item.value().entry().is_some_and(|entry| matches(entry)))
            .map(|item| (item.key().clone(), Arc::clone(item.value())))
            .collect();

        let mut destroyed = 0usize;
        for (key, slot) in candidates {
            // Only the caller that wins the removal shuts the resource down.
            if self
                .slots
                .remove_if(&key, |_, current| Arc::ptr_eq(current, &slot))
                .is_none()
            {
                continue;
            }
            let Some(entry) = slot.entry() else {
                continue;
            };
            destroyed += 1;
            Counters::bump(&self.counters.evictions);

            let age = (Utc::now() - entry.created_at).num_seconds();
            match entry.hook.shutdown().await {
                Ok(()) => {
                    tracing::info!(%key, owner = %entry.owner, age_secs = age, "Resource destroyed");
                }
                Err(error) => {
                    tracing::warn!(%key, owner = %entry.owner, %error, "Resource shutdown failed");
                }
            }
        }
        destroyed > 0
    }

    /// Number of live resources.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|item| item.value().cell.initialized())
            .count()
    }

    /// `true` when no resource is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when a live resource is cached under `key`.
    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.slots
            .get(key)
            .is_some_and(|slot| slot.cell.initialized())
    }

    /// The scope owning the resource under `key`.
    pub fn owner(&self, key: &ResourceKey) -> Option<ScopeId> {
        self.slots
            .get(key)
            .and_then(|slot| slot.entry().map(|entry| entry.owner.clone()))
    }

    /// Scopes that currently own at least one resource.
    pub fn scopes(&self) -> BTreeSet<ScopeId> {
        self.slots
            .iter()
            .filter_map(|item| item.value().entry().map(|entry| entry.owner.clone()))
            .collect()
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            requests: self.counters.requests.load(Ordering::Relaxed),
            creations: self.counters.creations.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("resources", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
