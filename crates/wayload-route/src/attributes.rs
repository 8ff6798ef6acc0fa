//! Opaque route attributes
//!
//! Attributes carry arbitrary per-route metadata supplied by the adapter
//! alongside the parameter maps (e.g. a static flag from the route table).
//! Values are type-erased; the engine compares them by identity, not by
//! value, when deciding whether a loader's cached result is still valid.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Type-erased attribute value
pub type AttributeValue = Arc<dyn Any + Send + Sync>;

/// Mapping from attribute name to an opaque value
///
/// Immutable per transition, like [`crate::RouteParams`].
#[derive(Clone, Default)]
pub struct RouteAttributes {
    entries: HashMap<String, AttributeValue>,
}

impl RouteAttributes {
    /// Create an empty attribute set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With an attribute value
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.entries.insert(name.into(), Arc::new(value));
        self
    }

    /// Insert an already-erased value
    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.entries.insert(name.into(), value);
    }

    /// Get the erased value for a name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries.get(name)
    }

    /// Get a typed view of an attribute, `None` on absence or type mismatch
    #[must_use]
    pub fn get_as<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.entries
            .get(name)
            .and_then(|value| Arc::clone(value).downcast::<T>().ok())
    }

    /// Number of attributes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for RouteAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteAttributes")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Identity comparison of two optional attribute values
///
/// Two values are "the same" only when both are absent or both point at the
/// same allocation. Value equality is deliberately not consulted: attributes
/// are opaque and need not implement `PartialEq`.
#[must_use]
pub fn attributes_identical(a: Option<&AttributeValue>, b: Option<&AttributeValue>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}
