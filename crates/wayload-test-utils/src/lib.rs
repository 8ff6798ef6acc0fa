//! Testing utilities for the wayload workspace
//!
//! Shared fixtures and helpers for the engine's test suites.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wayload_route::{RouteAttributes, RouteParams};

/// Initialize test tracing output once; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayload=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Params with a single single-valued path parameter
#[must_use]
pub fn path_param(name: &str, value: &str) -> RouteParams {
    RouteParams::new().with_path(name, [value])
}

/// Params with a single single-valued query parameter
#[must_use]
pub fn query_param(name: &str, value: &str) -> RouteParams {
    RouteParams::new().with_query(name, [value])
}

/// Attributes with a single string attribute
#[must_use]
pub fn string_attrib(name: &str, value: &str) -> RouteAttributes {
    RouteAttributes::new().with(name, value.to_string())
}

/// Downcast a type-erased loader result, panicking with context on mismatch
#[must_use]
pub fn result_as<T: Send + Sync + 'static>(result: &Arc<dyn Any + Send + Sync>) -> Arc<T> {
    Arc::clone(result)
        .downcast::<T>()
        .unwrap_or_else(|_| panic!("loader result is not a {}", std::any::type_name::<T>()))
}

/// Counts how many results a loader's free callback has released
#[derive(Debug, Default, Clone)]
pub struct FreeCounter {
    count: Arc<AtomicUsize>,
}

impl FreeCounter {
    /// Create a counter at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of results released so far
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// A free callback incrementing this counter
    pub fn hook<T>(&self) -> impl Fn(&T) + Send + Sync + 'static {
        let count = Arc::clone(&self.count);
        move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }
}
