//! Tests for [`ParameterSet`] as a cache key.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use resource_cache::{
    CacheRegistry, ParameterSet, ParameterValue, Resource, ResourceCacheBuilder, fetch_fn,
};

fn hash_of(key: &ParameterSet) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

fn vault_key(secret: &str) -> ParameterSet {
    ParameterSet::builder()
        .text("vault_url", "https://vault.example")
        .text("secret_name", secret)
        .integer("version", 3)
        .build()
}

#[test]
fn equality_ignores_insertion_order() {
    let a = ParameterSet::builder()
        .text("region", "eu-west-1")
        .boolean("fips", true)
        .build();
    let b = ParameterSet::builder()
        .boolean("fips", true)
        .text("region", "eu-west-1")
        .build();

    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn any_differing_value_separates_keys() {
    assert_ne!(vault_key("db"), vault_key("api"));

    let text = ParameterSet::builder().text("port", "1521").build();
    let int = ParameterSet::builder().integer("port", 1521).build();
    assert_ne!(text, int);

    let secret = ParameterSet::builder().secret("token", "a").build();
    let other_secret = ParameterSet::builder().secret("token", "b").build();
    assert_ne!(secret, other_secret);
}

#[test]
fn accessors() {
    let key = vault_key("db");
    assert_eq!(key.len(), 3);
    assert!(!key.is_empty());
    assert!(key.contains("version"));
    assert_eq!(key.get("secret_name"), Some(&ParameterValue::Text("db".into())));
    assert_eq!(key.get("missing"), None);

    let names: Vec<&str> = key.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["secret_name", "vault_url", "version"]);

    assert!(ParameterSet::default().is_empty());
}

#[test]
fn generic_set_accepts_conversions() {
    let key = ParameterSet::builder()
        .set("name", "wallet")
        .set("retries", 2_i64)
        .set("strict", false)
        .build();
    assert_eq!(key.get("name").and_then(ParameterValue::as_str), Some("wallet"));
    assert_eq!(key.get("retries").and_then(ParameterValue::as_i64), Some(2));
    assert_eq!(key.get("strict").and_then(ParameterValue::as_bool), Some(false));
}

#[tokio::test]
async fn equal_sets_share_a_cache_entry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let cache = ResourceCacheBuilder::new()
        .registry(&CacheRegistry::new())
        .build(fetch_fn("secret", move |key: ParameterSet| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                let name = key
                    .get("secret_name")
                    .and_then(ParameterValue::as_str)
                    .unwrap_or_default()
                    .to_string();
                Ok::<_, std::io::Error>(Resource::permanent(name))
            }
        }));

    let first = cache.request(&vault_key("db")).await.unwrap();
    let again = cache.request(&vault_key("db")).await.unwrap();
    let other = cache.request(&vault_key("api")).await.unwrap();

    assert_eq!(first.content(), "db");
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(other.content(), "api");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
