//! Resource cache - single-flight, bounded caching for remotely fetched
//! resources.
//!
//! Database drivers and similar clients pull connection strings,
//! credentials and TLS material from external secret stores. This crate
//! provides the caching layer that sits in front of those fetches:
//!
//! - [`ResourceCache`] wraps any [`ResourceFetcher`], coalesces concurrent
//!   requests for the same key into one delegate call, bounds memory with
//!   LRU eviction and refetches entries whose [`Resource::is_valid()`]
//!   check fails.
//! - [`CacheRegistry`] weakly tracks every cache so that
//!   [`CacheRegistry::clear_all()`] can invalidate all of them at once
//!   without keeping dropped caches alive.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use resource_cache::{fetch_fn, CacheRegistry, ParameterSet, Resource, ResourceCache};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), resource_cache::CacheError<std::io::Error>> {
//!     let tokens = ResourceCache::new(fetch_fn("oauth-token", |key: ParameterSet| async move {
//!         // ... exchange client credentials for a token ...
//!         let _ = key;
//!         Ok::<_, std::io::Error>(Resource::expires_in(
//!             "token".to_string(),
//!             Duration::from_secs(300),
//!         ))
//!     }));
//!
//!     let key = ParameterSet::builder()
//!         .text("tenant", "contoso")
//!         .secret("client_secret", "...")
//!         .build();
//!
//!     let token = tokens.request(&key).await?;
//!     println!("{}", token.content());
//!
//!     // After rotating credentials remotely:
//!     CacheRegistry::global().clear_all();
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod registry;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheStats, ResourceCache, ResourceCacheBuilder};
pub use config::CacheConfig;
pub use error::{CacheError, ConfigError, InternalError, Result};
pub use registry::{CacheId, CacheRegistry, Invalidate};
pub use traits::{FnFetcher, ResourceFetcher, fetch_fn};
pub use types::{ParameterSet, ParameterSetBuilder, ParameterValue, Resource, Validity};
