//! The delegate fetch operation wrapped by a [`ResourceCache`](crate::ResourceCache).
//!
//! Anything that can turn a key into a [`Resource`] implements
//! [`ResourceFetcher`]: a vault client, a config service, a file watcher.
//! The cache treats it as an opaque, possibly slow, possibly failing call.
//!
//! # Example
//!
//! ```ignore
//! struct SecretFetcher { client: VaultClient }
//!
//! #[async_trait]
//! impl ResourceFetcher<ParameterSet, String> for SecretFetcher {
//!     type Error = VaultError;
//!
//!     fn name(&self) -> &str {
//!         "vault-secret"
//!     }
//!
//!     async fn fetch(&self, key: &ParameterSet) -> Result<Resource<String>, VaultError> {
//!         let secret = self.client.read(key).await?;
//!         Ok(Resource::expires_at(secret.value, secret.expires_at))
//!     }
//! }
//! ```

use std::future::Future;

use async_trait::async_trait;

use crate::types::Resource;

/// Fetches the resource identified by a key from a remote system.
///
/// Errors are handed to every caller joined to the failed fetch unchanged
/// (wrapped in [`CacheError::Fetch`](crate::CacheError::Fetch)) and are
/// never cached.
#[async_trait]
pub trait ResourceFetcher<K, T>: Send + Sync {
    type Error: Send + Sync + 'static;

    /// Name used as the default cache label in logs and metrics.
    fn name(&self) -> &str {
        "resource"
    }

    async fn fetch(&self, key: &K) -> Result<Resource<T>, Self::Error>;
}

/// Adapter turning an async closure into a [`ResourceFetcher`].
///
/// Created by [`fetch_fn()`]. The closure receives an owned clone of the key.
pub struct FnFetcher<F> {
    name: String,
    f: F,
}

/// Wrap an async closure as a [`ResourceFetcher`].
///
/// ```rust
/// # use resource_cache::{fetch_fn, Resource};
/// let fetcher = fetch_fn("echo", |key: String| async move {
///     Ok::<_, std::io::Error>(Resource::permanent(key))
/// });
/// # let _ = fetcher;
/// ```
pub fn fetch_fn<F>(name: impl Into<String>, f: F) -> FnFetcher<F> {
    FnFetcher {
        name: name.into(),
        f,
    }
}

#[async_trait]
impl<K, T, E, F, Fut> ResourceFetcher<K, T> for FnFetcher<F>
where
    K: Clone + Send + Sync + 'static,
    T: Send + 'static,
    E: Send + Sync + 'static,
    F: Fn(K) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Resource<T>, E>> + Send + 'static,
{
    type Error = E;

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, key: &K) -> Result<Resource<T>, E> {
        (self.f)(key.clone()).await
    }
}
