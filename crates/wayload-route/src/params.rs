//! Route parameter maps
//!
//! Path and query parameters are multi-valued: each name maps to an ordered
//! sequence of raw string values. Absence of a name is distinct from a name
//! mapped to an empty sequence, and a present-but-empty string value is
//! distinct from both. The loader engine's reuse checks depend on these
//! distinctions, so they are preserved exactly.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered raw values of one parameter name
pub type RouteParamValues = Vec<String>;

/// Mapping from parameter name to its raw values
///
/// `IndexMap` keeps insertion order so that derived redirect targets are
/// deterministic.
pub type RouteParamMap = IndexMap<String, RouteParamValues>;

/// Where a parameter was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamSource {
    /// A path segment parameter
    Path,
    /// A query string parameter
    Query,
}

impl std::fmt::Display for ParamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
        }
    }
}

/// All route-derived parameters of one navigation
///
/// Immutable for the lifetime of one transition; the engine shares a single
/// instance across every loader it runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams {
    /// Path segment parameters
    pub path: RouteParamMap,
    /// Query string parameters
    pub query: RouteParamMap,
}

impl RouteParams {
    /// Create an empty parameter set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a path parameter
    #[must_use]
    pub fn with_path<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// With a query parameter
    #[must_use]
    pub fn with_query<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Get the raw values of a parameter, `None` if the name is absent
    #[inline]
    #[must_use]
    pub fn values(&self, source: ParamSource, name: &str) -> Option<&RouteParamValues> {
        match source {
            ParamSource::Path => self.path.get(name),
            ParamSource::Query => self.query.get(name),
        }
    }

    /// Get a mutable reference to the map for a source
    #[inline]
    pub fn map_mut(&mut self, source: ParamSource) -> &mut RouteParamMap {
        match source {
            ParamSource::Path => &mut self.path,
            ParamSource::Query => &mut self.query,
        }
    }
}

/// Pointwise comparison of two optional value sequences
///
/// Absence only matches absence; present sequences must have the same length
/// and the same values in the same order.
#[must_use]
pub fn values_equal(a: Option<&[String]>, b: Option<&[String]>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
