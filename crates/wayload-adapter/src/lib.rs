//! Wayload Adapter - glue between a navigation framework and the engine
//!
//! The engine itself only consumes normalized [`wayload_route::RouteParams`]
//! and a list of loaders per navigation. This crate carries the helpers a
//! router adapter needs to supply them:
//! - Normalizing raw, possibly-null route values into parameter maps
//! - Merging a redirect target into the current location for the retry
//! - A registry mapping stable route keys to their resolved loader lists
//! - A driver that loops a transition through its redirects to completion

#![warn(unreachable_pub)]

pub mod driver;
pub mod merge;
pub mod normalize;
pub mod registry;

// Re-exports for convenience
pub use driver::resolve_transition;
pub use merge::merge_redirect;
pub use normalize::{normalize_param_value, normalize_params};
pub use registry::LoaderRegistry;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
