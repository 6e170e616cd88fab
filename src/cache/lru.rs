//! Access-ordered, capacity-bounded map.
//!
//! Every `get` or `insert` moves the key to the most-recently-used position.
//! Inserting a new key into a full map evicts the least-recently-used key in
//! the same call. Recency is a monotonically increasing tick; the `order`
//! index maps ticks back to keys so the LRU key is always `order`'s first
//! entry.
//!
//! Not synchronised. [`ResourceCache`](crate::ResourceCache) keeps it behind
//! its mutex.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

struct Slot<V> {
    value: V,
    tick: u64,
}

pub(crate) struct AccessOrderedMap<K, V> {
    entries: HashMap<K, Slot<V>>,
    order: BTreeMap<u64, K>,
    next_tick: u64,
    capacity: usize,
}

impl<K, V> AccessOrderedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// `capacity` must be at least 1.
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "capacity must be non-zero");
        Self {
            entries: HashMap::with_capacity(capacity),
            order: BTreeMap::new(),
            next_tick: 0,
            capacity,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up `key` and mark it most recently used.
    pub(crate) fn get(&mut self, key: &K) -> Option<&V> {
        let tick = self.bump();
        let slot = self.entries.get_mut(key)?;
        self.order.remove(&slot.tick);
        slot.tick = tick;
        self.order.insert(tick, key.clone());
        Some(&slot.value)
    }

    /// Look up `key` without changing its recency.
    pub(crate) fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|slot| &slot.value)
    }

    /// Insert or replace `key` as most recently used.
    ///
    /// Returns the evicted entry when a new key pushed the map over capacity.
    /// Replacing an existing key never evicts.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let tick = self.bump();
        if let Some(slot) = self.entries.get_mut(&key) {
            self.order.remove(&slot.tick);
            slot.tick = tick;
            slot.value = value;
            self.order.insert(tick, key);
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };
        self.order.insert(tick, key.clone());
        self.entries.insert(key, Slot { value, tick });
        evicted
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.entries.remove(key)?;
        self.order.remove(&slot.tick);
        Some(slot.value)
    }

    /// Drop every entry, returning how many were held.
    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        self.order.clear();
        dropped
    }

    fn pop_lru(&mut self) -> Option<(K, V)> {
        let (_, key) = self.order.pop_first()?;
        let slot = self.entries.remove(&key)?;
        Some((key, slot.value))
    }

    fn bump(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    #[cfg(test)]
    fn keys_lru_first(&self) -> Vec<K> {
        self.order.values().cloned().collect()
    }
}
