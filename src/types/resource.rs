//! Cached resources and their freshness rules.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a [`Resource`] decides whether it may still be served from cache.
#[derive(Clone)]
pub enum Validity {
    /// Never goes stale (static secrets, configuration blobs).
    Permanent,
    /// Valid until the given instant (tokens, short-lived credentials).
    ExpiresAt(Instant),
    /// Implementation-defined check, polled on every cache read.
    Predicate(Arc<dyn Fn() -> bool + Send + Sync>),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Permanent => true,
            Self::ExpiresAt(deadline) => Instant::now() < *deadline,
            Self::Predicate(check) => check(),
        }
    }
}

impl fmt::Debug for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permanent => f.write_str("Permanent"),
            Self::ExpiresAt(deadline) => f.debug_tuple("ExpiresAt").field(deadline).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A fetched value plus the rule deciding when it goes stale.
///
/// The cache knows nothing about what makes a resource valid; it only calls
/// [`is_valid()`](Self::is_valid) when a cached entry is read.
///
/// ```rust
/// # use resource_cache::Resource;
/// # use std::time::Duration;
/// let password = Resource::permanent("hunter2".to_string());
/// assert!(password.is_valid());
///
/// let token = Resource::expires_in("bearer".to_string(), Duration::from_secs(300));
/// assert!(token.is_valid());
/// assert!(!token.is_permanent());
/// ```
#[derive(Debug, Clone)]
pub struct Resource<T> {
    content: T,
    validity: Validity,
}

impl<T> Resource<T> {
    pub fn new(content: T, validity: Validity) -> Self {
        Self { content, validity }
    }

    /// A resource that never expires.
    pub fn permanent(content: T) -> Self {
        Self::new(content, Validity::Permanent)
    }

    /// A resource valid until `deadline`.
    pub fn expires_at(content: T, deadline: Instant) -> Self {
        Self::new(content, Validity::ExpiresAt(deadline))
    }

    /// A resource valid for `ttl` from now.
    pub fn expires_in(content: T, ttl: Duration) -> Self {
        Self::expires_at(content, Instant::now() + ttl)
    }

    /// A resource whose validity is decided by `check`.
    pub fn with_predicate(content: T, check: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self::new(content, Validity::Predicate(Arc::new(check)))
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn into_content(self) -> T {
        self.content
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    pub fn is_valid(&self) -> bool {
        self.validity.is_valid()
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self.validity, Validity::Permanent)
    }
}
