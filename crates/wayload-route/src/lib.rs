//! Wayload Route - navigation input data model
//!
//! The leaf crate of the wayload workspace. Defines the types a navigation
//! adapter hands to the loader engine on every transition:
//! - Route parameters (multi-valued path and query maps)
//! - Opaque route attributes (static per-route metadata)
//! - Redirect targets and the redirect error family
//! - The sanitizer contract for validating raw string values
//!
//! # Example
//!
//! ```rust
//! use wayload_route::{RouteParams, sane_number, Sanitize};
//!
//! let params = RouteParams::new().with_path("id", ["42"]);
//! assert_eq!(params.path.get("id").map(Vec::len), Some(1));
//!
//! assert_eq!(sane_number.sanitize("42").unwrap(), 42);
//! assert_eq!(sane_number.sanitize("042").unwrap_err().replacement.as_deref(), Some("42"));
//! ```

#![warn(unreachable_pub)]

pub mod attributes;
pub mod params;
pub mod redirect;
pub mod sanitize;

// Re-exports for convenience
pub use attributes::{attributes_identical, AttributeValue, RouteAttributes};
pub use params::{values_equal, ParamSource, RouteParamMap, RouteParamValues, RouteParams};
pub use redirect::{RedirectError, RedirectLimitError, RedirectTarget};
pub use sanitize::{
    sane_boolean, sane_number, sane_option, sane_option_with, sane_string, InvalidParam, Sanitize,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
