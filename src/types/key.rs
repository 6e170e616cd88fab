//! Request keys built from named parameters.
//!
//! A [`ParameterSet`] captures the full configuration of a fetch (vault URL,
//! secret name, region, ...) as an immutable, value-comparable map. Two sets
//! are equal iff every parameter is equal, independent of insertion order,
//! which makes them suitable as [`ResourceCache`](crate::ResourceCache) keys.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A typed parameter value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    /// Sensitive text (tokens, passwords). Compared and hashed by value so it
    /// still separates cache entries, but never printed.
    Secret(String),
}

impl ParameterValue {
    /// The value as text, if it is `Text` or `Secret`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Secret(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Secret(_))
    }
}

impl fmt::Debug for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Secret(_) => f.write_str("<redacted>"),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ParameterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for ParameterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// Immutable set of named parameters identifying one cached request.
///
/// Cheap to clone (the map is shared behind an `Arc`).
///
/// ```rust
/// # use resource_cache::ParameterSet;
/// let a = ParameterSet::builder()
///     .text("vault_url", "https://vault.example")
///     .text("secret_name", "db-password")
///     .build();
/// let b = ParameterSet::builder()
///     .text("secret_name", "db-password")
///     .text("vault_url", "https://vault.example")
///     .build();
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ParameterSet {
    params: Arc<BTreeMap<String, ParameterValue>>,
}

impl ParameterSet {
    pub fn builder() -> ParameterSetBuilder {
        ParameterSetBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl fmt::Debug for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.params.iter()).finish()
    }
}

/// Builder for [`ParameterSet`]. Setting a name twice keeps the last value.
#[derive(Debug, Default)]
pub struct ParameterSetBuilder {
    params: BTreeMap<String, ParameterValue>,
}

impl ParameterSetBuilder {
    pub fn set(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, ParameterValue::Text(value.into()))
    }

    pub fn integer(self, name: impl Into<String>, value: i64) -> Self {
        self.set(name, ParameterValue::Integer(value))
    }

    pub fn boolean(self, name: impl Into<String>, value: bool) -> Self {
        self.set(name, ParameterValue::Boolean(value))
    }

    pub fn secret(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, ParameterValue::Secret(value.into()))
    }

    pub fn build(self) -> ParameterSet {
        ParameterSet {
            params: Arc::new(self.params),
        }
    }
}
