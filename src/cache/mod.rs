//! Bounded, single-flight resource cache.
//!
//! [`ResourceCache`] sits in front of a [`ResourceFetcher`] and guarantees:
//!
//! - **Single-flight**: for any key at most one delegate call is in flight;
//!   concurrent requesters join the same fetch and receive the same outcome.
//! - **Bounded memory**: at most `max_entries` keys, least-recently-used
//!   eviction.
//! - **Freshness**: a cached resource is re-checked with
//!   [`Resource::is_valid()`] on every read and refetched once it is stale.
//! - **Global invalidation**: every cache registers with a
//!   [`CacheRegistry`] so [`CacheRegistry::clear_all()`] reaches it.
//!
//! # Request flow
//!
//! ```text
//!  request(key)
//!      │
//!      ├─► lock: observe entry for key (touch LRU) ─► unlock
//!      │
//!      ├─► entry present, not failed ─► join ─► valid? ──► return (hit)
//!      │                                        │
//!      │                                        └─ stale ─┐
//!      ├─► no entry / failed entry ───────────────────────┤
//!      │                                                  ▼
//!      │                         build unstarted fetch unit for key
//!      │                                                  │
//!      ├─► lock: install it only if the entry is still the one observed
//!      │         (or gone, or failed); otherwise keep the installed one
//!      │
//!      └─► join whichever unit is installed ─► return its outcome
//! ```
//!
//! The mutex only guards map bookkeeping. It is never held across an
//! `.await`, so the delegate call and all joins happen outside it.

mod fetch;
mod lru;
mod stats;

pub use stats::CacheStats;

use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, instrument, trace};

use self::fetch::FetchUnit;
use self::lru::AccessOrderedMap;
use self::stats::StatsRecorder;
use crate::config::CacheConfig;
use crate::error::{CacheError, InternalError, Result};
use crate::registry::{CacheId, CacheRegistry, Invalidate, RegistryLink};
use crate::traits::ResourceFetcher;
use crate::types::Resource;

type Entries<K, T, E> = AccessOrderedMap<K, FetchUnit<T, E>>;

/// Thread-safe cache of remotely fetched resources.
///
/// Construct with [`ResourceCache::new()`] or [`ResourceCache::builder()`];
/// both return an `Arc` already registered with a [`CacheRegistry`].
///
/// Requests must be made from within a tokio runtime: each delegate call is
/// spawned as its own task so that a cancelled caller never cancels a fetch
/// other callers are waiting on.
///
/// ```rust,no_run
/// use resource_cache::{fetch_fn, ParameterSet, Resource, ResourceCache};
///
/// # async fn run() -> Result<(), resource_cache::CacheError<std::io::Error>> {
/// let cache = ResourceCache::new(fetch_fn("password", |key: ParameterSet| async move {
///     // ... call the secret store ...
///     Ok::<_, std::io::Error>(Resource::permanent(format!("{key:?}")))
/// }));
///
/// let key = ParameterSet::builder().text("secret_name", "db").build();
/// let password = cache.request(&key).await?;
/// println!("{}", password.content());
/// # Ok(())
/// # }
/// ```
pub struct ResourceCache<K, T, E> {
    id: CacheId,
    stats: Arc<StatsRecorder>,
    fetcher: Arc<dyn ResourceFetcher<K, T, Error = E>>,
    entries: Mutex<Entries<K, T, E>>,
    _link: RegistryLink,
}

// Key, resource and error types are fixed by `build()`, not here; the unit
// parameters only give `ResourceCache::builder()` a single impl to resolve to.
impl ResourceCache<(), (), ()> {
    /// Start configuring a cache. Shorthand for [`ResourceCacheBuilder::new()`].
    pub fn builder() -> ResourceCacheBuilder {
        ResourceCacheBuilder::new()
    }
}

impl<K, T, E> ResourceCache<K, T, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a cache sized by [`CacheConfig::global()`], registered with
    /// [`CacheRegistry::global()`] and labelled with the fetcher's name.
    pub fn new<F>(fetcher: F) -> Arc<Self>
    where
        F: ResourceFetcher<K, T, Error = E> + 'static,
    {
        ResourceCacheBuilder::new().build(fetcher)
    }

    /// Return the resource for `key`, fetching it if it is absent or stale.
    ///
    /// Concurrent calls for the same key share one delegate call. A delegate
    /// failure is returned to every caller joined to that fetch and is not
    /// cached: the next request for the key fetches again.
    ///
    /// A freshly fetched resource is returned even if it is already invalid;
    /// it will be refetched on the next request.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context.
    #[instrument(skip_all, fields(cache = self.stats.name()))]
    pub async fn request(&self, key: &K) -> Result<Arc<Resource<T>>, E> {
        let observed = self.lock()?.get(key).cloned();

        match &observed {
            Some(unit) if !unit.has_failed() => match unit.join().await {
                Ok(resource) if resource.is_valid() => {
                    trace!(unit = unit.id(), "cache hit");
                    self.stats.hit();
                    return Ok(resource);
                }
                Ok(_) => {
                    debug!(unit = unit.id(), "cached resource no longer valid, refetching");
                    self.stats.stale();
                }
                Err(err) => {
                    self.discard_failed(key, unit);
                    return Err(err);
                }
            },
            _ => {
                trace!("cache miss");
                self.stats.miss();
            }
        }

        let candidate = FetchUnit::new(
            Arc::clone(&self.fetcher),
            key.clone(),
            Arc::clone(&self.stats),
        );
        let unit = self.install(key, observed.as_ref(), candidate)?;

        let outcome = unit.join().await;
        if outcome.is_err() {
            self.discard_failed(key, &unit);
        }
        outcome
    }

    /// Drop every entry. Callers already waiting on a fetch still receive
    /// its result; later requests fetch afresh.
    pub fn clear(&self) {
        let dropped = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.clear()
        };
        // An empty map is consistent whatever happened before.
        self.entries.clear_poison();
        self.stats.clear();
        debug!(cache = self.stats.name(), dropped, "cache cleared");
    }

    /// Drop the entry for `key`, if any. Returns whether one was present.
    pub fn invalidate(&self, key: &K) -> Result<bool, E> {
        let removed = self.lock()?.remove(key).is_some();
        if removed {
            debug!(cache = self.stats.name(), "entry invalidated");
        }
        Ok(removed)
    }

    /// Whether `key` has an entry (in flight or completed). Does not count
    /// as an access for LRU purposes.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.peek(key).is_some())
            .unwrap_or(false)
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of keys held before eviction.
    pub fn capacity(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .capacity()
    }

    pub fn name(&self) -> &str {
        self.stats.name()
    }

    pub fn id(&self) -> CacheId {
        self.id
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Install `candidate` for `key` unless another caller already replaced
    /// the entry observed earlier. Returns the unit now installed.
    fn install(
        &self,
        key: &K,
        observed: Option<&FetchUnit<T, E>>,
        candidate: FetchUnit<T, E>,
    ) -> Result<FetchUnit<T, E>, E> {
        let mut entries = self.lock()?;

        let replaceable = match (entries.peek(key), observed) {
            (None, _) => true,
            (Some(current), Some(seen)) if current.is_same(seen) => true,
            (Some(current), _) => current.has_failed(),
        };

        if !replaceable {
            if let Some(current) = entries.get(key) {
                trace!(unit = current.id(), "joining fetch installed by another caller");
                return Ok(current.clone());
            }
        }

        if let Some((_, evicted)) = entries.insert(key.clone(), candidate.clone()) {
            debug!(evicted_unit = evicted.id(), "evicted least recently used entry");
            self.stats.eviction();
        }
        Ok(candidate)
    }

    /// Remove `unit` from the map if it is still the entry for `key`.
    fn discard_failed(&self, key: &K, unit: &FetchUnit<T, E>) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if entries.peek(key).is_some_and(|current| current.is_same(unit)) {
            entries.remove(key);
            trace!(unit = unit.id(), "discarded failed fetch");
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries<K, T, E>>, E> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Internal(InternalError::LockPoisoned))
    }
}

impl<K, T, E> Invalidate for ResourceCache<K, T, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn cache_id(&self) -> CacheId {
        self.id
    }

    fn clear(&self) {
        ResourceCache::clear(self);
    }
}

/// Builder for [`ResourceCache`].
///
/// ```rust
/// # use resource_cache::{fetch_fn, CacheRegistry, Resource, ResourceCacheBuilder};
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let registry = CacheRegistry::new();
/// let cache = ResourceCacheBuilder::new()
///     .name("tls-wallet")
///     .max_entries(4)
///     .registry(&registry)
///     .build(fetch_fn("wallet", |key: String| async move {
///         Ok::<_, std::io::Error>(Resource::permanent(key.len()))
///     }));
/// assert_eq!(cache.capacity(), 4);
/// assert!(registry.contains(cache.id()));
/// # }
/// ```
#[derive(Clone, Default)]
pub struct ResourceCacheBuilder {
    name: Option<String>,
    config: Option<CacheConfig>,
    registry: Option<CacheRegistry>,
}

impl ResourceCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label used in logs and metrics. Defaults to the fetcher's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Use `config` instead of [`CacheConfig::global()`].
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the maximum number of entries.
    pub fn max_entries(self, n: usize) -> Self {
        let config = self.config.clone().unwrap_or_else(|| CacheConfig::global().clone());
        self.config(config.max_entries(n))
    }

    /// Register with `registry` instead of [`CacheRegistry::global()`].
    pub fn registry(mut self, registry: &CacheRegistry) -> Self {
        self.registry = Some(registry.clone());
        self
    }

    pub fn build<K, T, F>(self, fetcher: F) -> Arc<ResourceCache<K, T, F::Error>>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
        F: ResourceFetcher<K, T> + 'static,
    {
        let config = self.config.unwrap_or_else(|| CacheConfig::global().clone());
        let registry = self.registry.unwrap_or_else(|| CacheRegistry::global().clone());
        let name: Arc<str> = Arc::from(self.name.as_deref().unwrap_or_else(|| fetcher.name()));
        let id = CacheId::next();

        let fetcher: Arc<dyn ResourceFetcher<K, T, Error = F::Error>> = Arc::new(fetcher);
        let cache = Arc::new(ResourceCache {
            id,
            stats: Arc::new(StatsRecorder::new(Arc::clone(&name))),
            fetcher,
            entries: Mutex::new(AccessOrderedMap::new(config.effective_max_entries())),
            _link: registry.link(id),
        });
        registry.register(&cache);

        debug!(
            cache = %name,
            cache_id = id.as_u64(),
            max_entries = config.effective_max_entries(),
            "resource cache created"
        );
        cache
    }
}
