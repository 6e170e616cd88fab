//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `resource_cache_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `cache` — the cache's name (see [`ResourceCacheBuilder::name()`](crate::ResourceCacheBuilder::name))
//! - `outcome` — fetch outcome: "ok" or "error"

/// Requests answered from a valid cached resource.
///
/// Labels: `cache`.
pub const CACHE_HITS_TOTAL: &str = "resource_cache_hits_total";

/// Requests for a key with no usable entry.
///
/// Labels: `cache`.
pub const CACHE_MISSES_TOTAL: &str = "resource_cache_misses_total";

/// Requests that found a cached resource whose validity check failed.
///
/// Labels: `cache`.
pub const STALE_REFRESHES_TOTAL: &str = "resource_cache_stale_refreshes_total";

/// Delegate fetches started by the cache.
///
/// Labels: `cache`, `outcome` ("ok" | "error").
pub const FETCHES_TOTAL: &str = "resource_cache_fetches_total";

/// Entries dropped to stay within capacity.
///
/// Labels: `cache`.
pub const EVICTIONS_TOTAL: &str = "resource_cache_evictions_total";

/// Whole-cache invalidations, local or registry-wide.
///
/// Labels: `cache`.
pub const CLEARS_TOTAL: &str = "resource_cache_clears_total";
