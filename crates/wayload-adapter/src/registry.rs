//! Loader registry
//!
//! Routers resolve which loaders belong to a navigation target once, not
//! on every navigation. The registry is that resolution, made explicit: a
//! concurrent mapping from a stable per-route key to the route's loader
//! list, registered when the route table is built and evicted only when it
//! changes.

use dashmap::DashMap;
use std::sync::Arc;
use wayload_core::AnyLoader;

/// Mapping from stable route keys to resolved loader lists
#[derive(Default)]
pub struct LoaderRegistry {
    routes: DashMap<String, Vec<Arc<dyn AnyLoader>>>,
}

impl LoaderRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the loader list for a route key, replacing any previous one
    pub fn register(&self, key: impl Into<String>, loaders: Vec<Arc<dyn AnyLoader>>) {
        let key = key.into();
        tracing::debug!(target: "wayload", route = %key, loaders = loaders.len(), "registering route loaders");
        self.routes.insert(key, loaders);
    }

    /// The loader list for a route key, if registered
    #[must_use]
    pub fn loaders_for(&self, key: &str) -> Option<Vec<Arc<dyn AnyLoader>>> {
        self.routes.get(key).map(|entry| entry.value().clone())
    }

    /// Forget a route key
    pub fn unregister(&self, key: &str) {
        self.routes.remove(key);
    }

    /// Forget every route
    pub fn clear(&self) {
        self.routes.clear();
    }

    /// Number of registered routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("routes", &self.routes.len())
            .finish()
    }
}
