//! Dependency-recording scope
//!
//! A [`TrackingScope`] is bound to one navigation's params and attributes
//! and records, per read, which names were consulted and which loaders were
//! invoked together with the result identity observed. The snapshot it
//! accumulates is what a loader later compares against a new navigation to
//! decide whether its cached result still holds.

use crate::loader::{AnyLoader, LoaderId};
use crate::scope::Scope;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use wayload_route::{
    attributes_identical, values_equal, AttributeValue, ParamSource, RouteAttributes, RouteParams,
    RouteParamValues,
};

/// One recorded nested-loader read: the loader and the result identity
/// (epoch) observed at read time
#[derive(Clone)]
pub(crate) struct LoaderUse {
    pub(crate) loader: Arc<dyn AnyLoader>,
    pub(crate) epoch: u64,
}

#[derive(Default)]
struct TrackingState {
    used_path: HashSet<String>,
    used_query: HashSet<String>,
    used_attribs: HashSet<String>,
    used_loaders: Vec<LoaderUse>,
}

/// Concrete [`Scope`] that records every read as a dependency
///
/// Exclusively owned by the single loader invocation (or transition) that
/// created it; once superseded it is only read for comparison, never reused
/// to serve another computation.
pub struct TrackingScope {
    params: Arc<RouteParams>,
    attribs: Arc<RouteAttributes>,
    state: Mutex<TrackingState>,
}

impl TrackingScope {
    /// Create a scope over one navigation's inputs
    #[must_use]
    pub fn new(params: Arc<RouteParams>, attribs: Arc<RouteAttributes>) -> Self {
        Self {
            params,
            attribs,
            state: Mutex::new(TrackingState::default()),
        }
    }

    /// The params this scope reads from
    #[inline]
    #[must_use]
    pub fn params(&self) -> &Arc<RouteParams> {
        &self.params
    }

    /// The attributes this scope reads from
    #[inline]
    #[must_use]
    pub fn attribs(&self) -> &Arc<RouteAttributes> {
        &self.attribs
    }

    /// Names of path parameters read so far
    #[must_use]
    pub fn used_path_params(&self) -> HashSet<String> {
        self.state.lock().used_path.clone()
    }

    /// Names of query parameters read so far
    #[must_use]
    pub fn used_query_params(&self) -> HashSet<String> {
        self.state.lock().used_query.clone()
    }

    /// Names of attributes read so far
    #[must_use]
    pub fn used_attributes(&self) -> HashSet<String> {
        self.state.lock().used_attribs.clone()
    }

    /// Identities of loaders consulted so far
    #[must_use]
    pub fn used_loader_ids(&self) -> Vec<LoaderId> {
        self.state
            .lock()
            .used_loaders
            .iter()
            .map(|used| used.loader.id())
            .collect()
    }

    /// Record a nested loader read with the result identity observed
    ///
    /// A repeated read of the same loader overwrites the recorded identity;
    /// within one computation both reads observe the same cached result
    /// anyway.
    pub fn record_loader_use(&self, loader: Arc<dyn AnyLoader>, epoch: u64) {
        let mut state = self.state.lock();
        if let Some(used) = state
            .used_loaders
            .iter_mut()
            .find(|used| used.loader.id() == loader.id())
        {
            used.epoch = epoch;
        } else {
            state.used_loaders.push(LoaderUse { loader, epoch });
        }
    }

    /// Loaders this scope consulted, for the transitive active-set walk
    pub(crate) fn loader_uses(&self) -> Vec<LoaderUse> {
        self.state.lock().used_loaders.clone()
    }

    /// Whether a navigation with the given inputs would change anything
    /// this scope actually read
    ///
    /// This is the reuse check run against a loader's snapshot: pointwise
    /// value comparison for every used parameter name (absence must match
    /// absence), identity comparison for every used attribute, and for
    /// every consulted loader a recursive check plus the observed result
    /// identity.
    pub(crate) fn invalidated_by(
        &self,
        params: &RouteParams,
        attribs: &RouteAttributes,
    ) -> bool {
        let uses = {
            let state = self.state.lock();
            for name in &state.used_path {
                if !values_equal(
                    self.params.path.get(name).map(Vec::as_slice),
                    params.path.get(name).map(Vec::as_slice),
                ) {
                    return true;
                }
            }
            for name in &state.used_query {
                if !values_equal(
                    self.params.query.get(name).map(Vec::as_slice),
                    params.query.get(name).map(Vec::as_slice),
                ) {
                    return true;
                }
            }
            for name in &state.used_attribs {
                if !attributes_identical(self.attribs.get(name), attribs.get(name)) {
                    return true;
                }
            }
            state.used_loaders.clone()
        };
        // Recurse without holding the lock; dependency cycles are a caller
        // error and are not detected here.
        uses.iter()
            .any(|used| used.loader.needs_load(params, attribs) || used.loader.current_epoch() != used.epoch)
    }
}

impl Scope for TrackingScope {
    fn raw_param_values(&self, source: ParamSource, name: &str) -> Option<RouteParamValues> {
        {
            let mut state = self.state.lock();
            match source {
                ParamSource::Path => state.used_path.insert(name.to_string()),
                ParamSource::Query => state.used_query.insert(name.to_string()),
            };
        }
        self.params.values(source, name).cloned()
    }

    fn raw_attribute(&self, name: &str) -> Option<AttributeValue> {
        self.state.lock().used_attribs.insert(name.to_string());
        self.attribs.get(name).cloned()
    }
}

impl std::fmt::Debug for TrackingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TrackingScope")
            .field("used_path", &state.used_path)
            .field("used_query", &state.used_query)
            .field("used_attribs", &state.used_attribs)
            .field("used_loaders", &state.used_loaders.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayload_route::sane_number;

    fn scope_with(params: RouteParams) -> TrackingScope {
        TrackingScope::new(Arc::new(params), Arc::new(RouteAttributes::new()))
    }

    #[test]
    fn reads_record_names_unconditionally() {
        let scope = scope_with(
            RouteParams::new()
                .with_query("multi", ["a", "b"])
                .with_path("id", ["007"]),
        );

        // Successful, absent, and redirecting reads all record.
        assert!(scope.query_value("missing").unwrap().is_none());
        assert!(scope.query_value("multi").is_err());
        assert!(scope.path_param("id", sane_number, None).is_err());

        let used_query = scope.used_query_params();
        assert!(used_query.contains("missing"));
        assert!(used_query.contains("multi"));
        assert!(scope.used_path_params().contains("id"));
    }

    #[test]
    fn attribute_reads_record_names() {
        let attribs = RouteAttributes::new().with("verb", "says".to_string());
        let scope = TrackingScope::new(Arc::new(RouteParams::new()), Arc::new(attribs));

        assert!(scope.attribute::<String>("verb").is_some());
        assert!(scope.attribute::<String>("absent").is_none());

        let used = scope.used_attributes();
        assert!(used.contains("verb"));
        assert!(used.contains("absent"));
    }

    #[test]
    fn invalidation_by_param_change() {
        let scope = scope_with(RouteParams::new().with_path("name", ["Eve"]));
        assert_eq!(scope.path_value("name").unwrap().as_deref(), Some("Eve"));

        let same = RouteParams::new().with_path("name", ["Eve"]);
        let changed = RouteParams::new().with_path("name", ["Adam"]);
        let attribs = RouteAttributes::new();

        assert!(!scope.invalidated_by(&same, &attribs));
        assert!(scope.invalidated_by(&changed, &attribs));
        assert!(scope.invalidated_by(&RouteParams::new(), &attribs));
    }

    #[test]
    fn unread_params_do_not_invalidate() {
        let scope = scope_with(RouteParams::new().with_path("name", ["Eve"]));
        // Nothing read yet, so any params are compatible.
        let changed = RouteParams::new().with_path("name", ["Adam"]);
        assert!(!scope.invalidated_by(&changed, &RouteAttributes::new()));
    }

    #[test]
    fn invalidation_by_attribute_identity() {
        let attribs = Arc::new(RouteAttributes::new().with("verb", "says".to_string()));
        let scope = TrackingScope::new(Arc::new(RouteParams::new()), Arc::clone(&attribs));
        assert!(scope.attribute::<String>("verb").is_some());

        // The same attribute set is compatible, a rebuilt one is not.
        assert!(!scope.invalidated_by(&RouteParams::new(), &attribs));
        let rebuilt = RouteAttributes::new().with("verb", "says".to_string());
        assert!(scope.invalidated_by(&RouteParams::new(), &rebuilt));
    }
}
