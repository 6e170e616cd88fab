//! Per-cache counters mirrored into `metrics`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::telemetry;

/// Point-in-time snapshot of a cache's counters.
///
/// Counted since construction; [`ResourceCache::clear()`](crate::ResourceCache::clear)
/// does not reset them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered by a valid cached resource.
    pub hits: u64,
    /// Requests that found no usable entry.
    pub misses: u64,
    /// Requests that found a resource whose validity check failed.
    pub stale_refreshes: u64,
    /// Delegate fetches started.
    pub fetches: u64,
    /// Delegate fetches that failed (error, panic or cancellation).
    pub fetch_failures: u64,
    /// Entries evicted to respect capacity.
    pub evictions: u64,
    /// Whole-cache clears.
    pub clears: u64,
}

/// Shared between a cache and its in-flight fetch units.
pub(crate) struct StatsRecorder {
    name: Arc<str>,
    hits: AtomicU64,
    misses: AtomicU64,
    stale_refreshes: AtomicU64,
    fetches: AtomicU64,
    fetch_failures: AtomicU64,
    evictions: AtomicU64,
    clears: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn new(name: Arc<str>) -> Self {
        Self {
            name,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stale_refreshes: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            clears: AtomicU64::new(0),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::CACHE_HITS_TOTAL, "cache" => self.label()).increment(1);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "cache" => self.label()).increment(1);
    }

    pub(crate) fn stale(&self) {
        self.stale_refreshes.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::STALE_REFRESHES_TOTAL, "cache" => self.label())
            .increment(1);
    }

    pub(crate) fn fetch_started(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fetch_finished(&self, ok: bool) {
        if !ok {
            self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        }
        let outcome = if ok { "ok" } else { "error" };
        metrics::counter!(
            telemetry::FETCHES_TOTAL,
            "cache" => self.label(),
            "outcome" => outcome
        )
        .increment(1);
    }

    pub(crate) fn eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::EVICTIONS_TOTAL, "cache" => self.label()).increment(1);
    }

    pub(crate) fn clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::CLEARS_TOTAL, "cache" => self.label()).increment(1);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stale_refreshes: self.stale_refreshes.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }

    fn label(&self) -> String {
        self.name.to_string()
    }
}
