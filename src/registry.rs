//! Process-wide invalidation registry.
//!
//! [`CacheRegistry`] keeps a *weak* reference to every registered cache so
//! that application code can force all of them to drop their contents at
//! once (e.g. after rotating a remote credential) via
//! [`CacheRegistry::clear_all()`].
//!
//! # Membership
//!
//! Registration never extends a cache's lifetime. A cache removes itself
//! when its last strong reference is dropped, and every `clear_all()` sweep
//! additionally prunes references whose referent is already gone.
//!
//! # Locking
//!
//! The membership mutex is only held while the member table is read or
//! written. `clear_all()` upgrades the live members under the mutex,
//! releases it, and only then calls each cache's `clear()`. A cache's own
//! lock is therefore never taken while the registry lock is held, and a
//! cache dropped mid-sweep can deregister itself without deadlocking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, trace};

static GLOBAL: LazyLock<CacheRegistry> = LazyLock::new(CacheRegistry::new);

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a cache instance within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheId(u64);

impl CacheId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// A cache that can be invalidated as a whole.
///
/// Implemented by [`ResourceCache`](crate::ResourceCache); other cache types
/// may implement it to take part in [`CacheRegistry::clear_all()`].
pub trait Invalidate: Send + Sync {
    fn cache_id(&self) -> CacheId;

    /// Drop every entry.
    fn clear(&self);
}

type Members = Mutex<HashMap<CacheId, Weak<dyn Invalidate>>>;

/// Non-owning registry of caches.
///
/// Cheap to clone; clones share the same member table.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    members: Arc<Members>,
}

impl CacheRegistry {
    /// Create an empty, independent registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry caches join by default.
    pub fn global() -> &'static CacheRegistry {
        &GLOBAL
    }

    /// Add a weak reference to `cache`. Registering the same cache twice is
    /// a no-op.
    pub fn register<C>(&self, cache: &Arc<C>)
    where
        C: Invalidate + 'static,
    {
        let id = cache.cache_id();
        let weak: Weak<dyn Invalidate> = Arc::downgrade(cache) as Weak<dyn Invalidate>;
        let mut members = self.lock();
        if members.contains_key(&id) {
            trace!(cache_id = id.as_u64(), "cache already registered");
            return;
        }
        members.insert(id, weak);
        debug!(cache_id = id.as_u64(), members = members.len(), "cache registered");
    }

    /// Remove the cache with `id`, if present.
    pub fn deregister(&self, id: CacheId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            trace!(cache_id = id.as_u64(), "cache deregistered");
        }
        removed
    }

    /// Clear every live registered cache and prune dead references.
    ///
    /// Returns how many caches were cleared. Safe to call with no members,
    /// repeatedly, and concurrently with registration and cache requests.
    pub fn clear_all(&self) -> usize {
        let live: Vec<Arc<dyn Invalidate>> = {
            let mut members = self.lock();
            let mut live = Vec::with_capacity(members.len());
            members.retain(|_, weak| match weak.upgrade() {
                Some(cache) => {
                    live.push(cache);
                    true
                }
                None => false,
            });
            live
        };

        for cache in &live {
            cache.clear();
        }
        debug!(cleared = live.len(), "cleared all registered caches");
        live.len()
    }

    /// Number of registered entries, including ones not yet pruned.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: CacheId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Handle that deregisters `id` from this registry when dropped.
    pub(crate) fn link(&self, id: CacheId) -> RegistryLink {
        RegistryLink {
            members: Arc::downgrade(&self.members),
            id,
        }
    }

    // The table holds only weak references, so a panic mid-update cannot
    // leave it inconsistent; recover from poisoning.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheId, Weak<dyn Invalidate>>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Deregisters a cache from its registry on drop.
///
/// Owned by the cache itself, so the registry entry disappears as soon as
/// the cache does rather than waiting for the next sweep.
pub(crate) struct RegistryLink {
    members: Weak<Members>,
    id: CacheId,
}

impl Drop for RegistryLink {
    fn drop(&mut self) {
        if let Some(members) = self.members.upgrade() {
            CacheRegistry { members }.deregister(self.id);
        }
    }
}
