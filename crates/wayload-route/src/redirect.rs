//! Redirect signals
//!
//! A read that finds an invalid or redundant input does not fail the
//! navigation; it requests a corrected one. [`RedirectError`] is that
//! request: control flow, not a defect. [`RedirectLimitError`] is the
//! terminal error raised when corrections keep chasing each other.

use crate::params::{ParamSource, RouteParamMap, RouteParamValues};
use serde::{Deserialize, Serialize};

/// Partial parameter correction describing the navigation to retry with
///
/// Only the names present in the target change; everything else is carried
/// over from the current navigation by the adapter. A name mapped to an
/// empty sequence means "remove this parameter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    /// Path parameter corrections
    pub path: RouteParamMap,
    /// Query parameter corrections
    pub query: RouteParamMap,
}

impl RedirectTarget {
    /// Create an empty target
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a corrected parameter value sequence
    #[must_use]
    pub fn with_param<I, S>(mut self, source: ParamSource, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map_mut(source)
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// With a parameter removal (empty value sequence)
    #[must_use]
    pub fn with_removal(self, source: ParamSource, name: impl Into<String>) -> Self {
        self.with_param(source, name, Vec::<String>::new())
    }

    /// Corrections for a source
    #[inline]
    #[must_use]
    pub fn map(&self, source: ParamSource) -> &RouteParamMap {
        match source {
            ParamSource::Path => &self.path,
            ParamSource::Query => &self.query,
        }
    }

    fn map_mut(&mut self, source: ParamSource) -> &mut RouteParamMap {
        match source {
            ParamSource::Path => &mut self.path,
            ParamSource::Query => &mut self.query,
        }
    }

    /// Whether the target carries no corrections at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.query.is_empty()
    }
}

/// Request to re-navigate to a corrected location
///
/// Raised by scope reads when a value is malformed or redundant, and
/// propagated by the engine as the transition outcome. The adapter merges
/// the carried target into the current location and navigates again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("redirect requested")]
pub struct RedirectError {
    /// The corrected location
    pub target: RedirectTarget,
}

impl RedirectError {
    /// Create a redirect carrying the given target
    #[inline]
    #[must_use]
    pub fn new(target: RedirectTarget) -> Self {
        Self { target }
    }

    /// Redirect correcting a single parameter to the given values
    ///
    /// An empty `values` sequence removes the parameter.
    #[must_use]
    pub fn fix_param(
        source: ParamSource,
        name: impl Into<String>,
        values: RouteParamValues,
    ) -> Self {
        Self::new(RedirectTarget::new().with_param(source, name, values))
    }
}

/// Raised when consecutive redirects exceed the configured limit
///
/// Indicates a likely correction cycle, e.g. two sanitizers that keep
/// rewriting each other's output. Never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("redirect limit reached")]
pub struct RedirectLimitError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_param_builds_single_entry_target() {
        let err = RedirectError::fix_param(ParamSource::Query, "page", vec!["1".to_string()]);
        assert_eq!(
            err.target.query.get("page"),
            Some(&vec!["1".to_string()])
        );
        assert!(err.target.path.is_empty());
    }

    #[test]
    fn removal_is_empty_sequence() {
        let target = RedirectTarget::new().with_removal(ParamSource::Query, "stale");
        assert_eq!(target.query.get("stale"), Some(&vec![]));
        assert!(!target.is_empty());
    }

    #[test]
    fn target_serializes() {
        let target = RedirectTarget::new().with_param(ParamSource::Path, "id", ["7"]);
        let json = serde_json::to_string(&target).unwrap();
        let back: RedirectTarget = serde_json::from_str(&json).unwrap();
        assert_eq!(target, back);
    }
}
