//! Resource cache error types

use std::sync::Arc;

/// Error returned by [`ResourceCache::request()`](crate::ResourceCache::request).
///
/// Separates "the remote call failed" ([`CacheError::Fetch`]) from "the
/// local wait was aborted" ([`CacheError::Internal`]). A stale resource being
/// replaced is not an error and never shows up here.
#[derive(Debug, thiserror::Error)]
pub enum CacheError<E> {
    /// The delegate fetcher failed. Every caller joined to the same fetch
    /// receives the same underlying error.
    #[error("resource fetch failed: {0}")]
    Fetch(Arc<E>),

    #[error("internal cache error: {0}")]
    Internal(#[from] InternalError),
}

// Manual impl: `Arc<E>` is cloneable for any `E`, derive would demand `E: Clone`.
impl<E> Clone for CacheError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Fetch(err) => Self::Fetch(Arc::clone(err)),
            Self::Internal(err) => Self::Internal(err.clone()),
        }
    }
}

impl<E> CacheError<E> {
    /// The delegate's own error, if this is a fetch failure.
    pub fn fetch_error(&self) -> Option<&E> {
        match self {
            Self::Fetch(err) => Some(err.as_ref()),
            Self::Internal(_) => None,
        }
    }

    /// Whether the delegate fetch failed.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }

    /// Whether the failure is local to the cache (task fault, poisoned lock).
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Local concurrency faults, surfaced distinctly from delegate failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    #[error("fetch task panicked: {0}")]
    FetchPanicked(String),

    #[error("fetch task was cancelled before completing")]
    FetchCancelled,

    #[error("cache lock poisoned")]
    LockPoisoned,
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Result type alias for cache requests.
pub type Result<T, E> = std::result::Result<T, CacheError<E>>;
