//! Wayload Core - dependency-tracked loader engine
//!
//! A demand-driven memoization engine for per-navigation data loading:
//! - Loaders compute results from route inputs and from each other
//! - Every read is recorded, so results are invalidated precisely when an
//!   input a loader actually read has changed
//! - Invalid or redundant inputs self-correct through redirects instead of
//!   surfacing as user-visible errors
//! - Caches are swept generationally between transitions
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wayload_core::{AnyLoader, Loader, Manager, Scope};
//! use wayload_route::{RouteAttributes, RouteParams};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let user = Loader::new(|scope, _previous: Option<Arc<String>>| async move {
//!     Ok(scope.path_value("name")?.unwrap_or_default())
//! });
//!
//! let manager = Manager::default();
//! let loaders: Vec<Arc<dyn AnyLoader>> = vec![user];
//! let params = RouteParams::new().with_path("name", ["Eve"]);
//! let results = manager
//!     .start_transition("user", &loaders, params, RouteAttributes::new())
//!     .await?;
//! manager.end_transition();
//!
//! assert_eq!(*results[0].clone().downcast::<String>().unwrap(), "Eve");
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod config;
pub mod error;
pub mod loader;
pub mod manager;
pub mod scope;
pub mod tracking;

// Re-exports for convenience
pub use config::{DebugSink, ManagerConfig, DEFAULT_REDIRECT_LIMIT};
pub use error::{LoadError, TransitionError};
pub use loader::{collect_affected_loaders, AnyLoader, ErasedResult, Loader, LoaderId, SharedResult};
pub use manager::Manager;
pub use scope::Scope;
pub use tracking::TrackingScope;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the loader engine
    pub use crate::{
        AnyLoader, DebugSink, LoadError, Loader, LoaderId, Manager, ManagerConfig, Scope,
        TrackingScope, TransitionError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
