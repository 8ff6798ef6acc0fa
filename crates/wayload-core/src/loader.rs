//! Memoizing, dependency-aware loaders
//!
//! A [`Loader`] wraps an async computation over route inputs. Its result is
//! cached together with the dependency snapshot recorded while computing
//! it; a later navigation reuses the cached in-flight future verbatim
//! unless something the computation actually read has changed. Result
//! identity is reified as a per-loader monotonic epoch so that nested
//! consumers can compare "the result I saw" against "the result there is
//! now" without comparing values.

use crate::error::LoadError;
use crate::tracking::TrackingScope;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Weak};
use ulid::Ulid;
use wayload_route::{RouteAttributes, RouteParams};

/// Unique loader identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoaderId(pub Ulid);

impl LoaderId {
    /// Generate new loader ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for LoaderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LoaderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A loader's type-erased result, as collected by the manager
pub type ErasedResult = Arc<dyn Any + Send + Sync>;

/// Shared handle to a loader's cached (possibly in-flight) computation
pub type SharedResult<T> = Shared<BoxFuture<'static, Result<Arc<T>, LoadError>>>;

type OnLoad<T> = Box<
    dyn Fn(Arc<TrackingScope>, Option<Arc<T>>) -> BoxFuture<'static, Result<T, LoadError>>
        + Send
        + Sync,
>;
type OnFree<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Cached computation and the snapshot recorded while producing it; the
/// two live and die together.
struct CachedLoad<T> {
    shared: SharedResult<T>,
    snapshot: Arc<TrackingScope>,
}

struct LoaderState<T> {
    /// Result history, most recent first
    results: Vec<Arc<T>>,
    cached: Option<CachedLoad<T>>,
    /// Bumped on every recomputation; the reified result identity
    epoch: u64,
}

impl<T> Default for LoaderState<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            cached: None,
            epoch: 0,
        }
    }
}

/// A memoized, dependency-aware asynchronous computation node
pub struct Loader<T> {
    id: LoaderId,
    on_load: OnLoad<T>,
    on_free: Option<OnFree<T>>,
    state: Mutex<LoaderState<T>>,
    /// Back-reference to the owning `Arc`, needed to hand out
    /// `Arc<dyn AnyLoader>` handles from `&self` methods. Always
    /// upgradable: loaders are only ever constructed behind an `Arc`.
    weak_self: Weak<Loader<T>>,
}

impl<T: Send + Sync + 'static> Loader<T> {
    /// Create a loader from its computation
    ///
    /// `on_load` receives a fresh tracking scope and the most recently
    /// resolved result of this same loader (`None` on first computation or
    /// after a full eviction).
    #[must_use]
    pub fn new<F, Fut>(on_load: F) -> Arc<Self>
    where
        F: Fn(Arc<TrackingScope>, Option<Arc<T>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, LoadError>> + Send + 'static,
    {
        Self::build(on_load, None)
    }

    /// Create a loader with a cleanup callback for released results
    #[must_use]
    pub fn with_free<F, Fut, G>(on_load: F, on_free: G) -> Arc<Self>
    where
        F: Fn(Arc<TrackingScope>, Option<Arc<T>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, LoadError>> + Send + 'static,
        G: Fn(&T) + Send + Sync + 'static,
    {
        Self::build(on_load, Some(Box::new(on_free)))
    }

    fn build<F, Fut>(on_load: F, on_free: Option<OnFree<T>>) -> Arc<Self>
    where
        F: Fn(Arc<TrackingScope>, Option<Arc<T>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, LoadError>> + Send + 'static,
    {
        Arc::new_cyclic(|weak| Self {
            id: LoaderId::new(),
            on_load: Box::new(move |scope, previous| on_load(scope, previous).boxed()),
            on_free,
            state: Mutex::new(LoaderState::default()),
            weak_self: weak.clone(),
        })
    }

    fn strong_self(&self) -> Arc<Self> {
        self.weak_self
            .upgrade()
            .expect("loaders are only constructed behind an Arc")
    }

    /// Get this loader's (possibly cached) result for the given navigation
    ///
    /// Synchronously decides reuse versus recomputation, installs the new
    /// computation when needed, and records the read into `scope` with the
    /// result identity being returned. The returned future can be awaited
    /// by any number of consumers; they all observe the same settled
    /// outcome.
    pub fn get_result(&self, scope: &TrackingScope) -> SharedResult<T> {
        let (shared, epoch) = {
            let mut state = self.state.lock();
            match &state.cached {
                Some(cached)
                    if !cached.snapshot.invalidated_by(scope.params(), scope.attribs()) =>
                {
                    (cached.shared.clone(), state.epoch)
                }
                _ => {
                    state.epoch += 1;
                    tracing::debug!(
                        target: "wayload",
                        loader = %self.id,
                        epoch = state.epoch,
                        "recomputing loader"
                    );
                    let local = Arc::new(TrackingScope::new(
                        Arc::clone(scope.params()),
                        Arc::clone(scope.attribs()),
                    ));
                    let previous = state.results.first().cloned();
                    let this = self.strong_self();
                    let snapshot = Arc::clone(&local);
                    // The snapshot is attached before the future is first
                    // polled so concurrent siblings reading this loader
                    // mid-flight observe consistent dependency identity.
                    let shared = async move {
                        let result = Arc::new((this.on_load)(local, previous).await?);
                        this.state.lock().results.insert(0, Arc::clone(&result));
                        Ok(result)
                    }
                    .boxed()
                    .shared();
                    state.cached = Some(CachedLoad {
                        shared: shared.clone(),
                        snapshot,
                    });
                    (shared, state.epoch)
                }
            }
        };
        scope.record_loader_use(self.strong_self() as Arc<dyn AnyLoader>, epoch);
        shared
    }

    fn free_results(&self, results: &[Arc<T>]) {
        if let Some(on_free) = &self.on_free {
            for result in results {
                on_free(result);
            }
        }
    }
}

impl<T> std::fmt::Debug for Loader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Loader")
            .field("id", &self.id)
            .field("epoch", &state.epoch)
            .field("results", &state.results.len())
            .field("cached", &state.cached.is_some())
            .finish()
    }
}

/// Object-safe view of a loader, as held by the manager and by dependency
/// snapshots
pub trait AnyLoader: Send + Sync {
    /// Stable loader identity
    fn id(&self) -> LoaderId;

    /// Whether a navigation with these inputs would force recomputation
    fn needs_load(&self, params: &RouteParams, attribs: &RouteAttributes) -> bool;

    /// Identity of the current cached result; bumped on every
    /// recomputation, preserved across eviction
    fn current_epoch(&self) -> u64;

    /// Type-erased `get_result`
    fn load_erased(
        &self,
        scope: &TrackingScope,
    ) -> BoxFuture<'static, Result<ErasedResult, LoadError>>;

    /// Loaders the current snapshot consulted
    fn dependencies(&self) -> Vec<Arc<dyn AnyLoader>>;

    /// Release all but the most recent result, trimming history
    /// accumulated across reuse-skips
    fn clean(&self);

    /// Release everything and forget the cached computation and snapshot
    fn reset(&self);
}

impl<T: Send + Sync + 'static> AnyLoader for Loader<T> {
    fn id(&self) -> LoaderId {
        self.id
    }

    fn needs_load(&self, params: &RouteParams, attribs: &RouteAttributes) -> bool {
        let snapshot = self
            .state
            .lock()
            .cached
            .as_ref()
            .map(|cached| Arc::clone(&cached.snapshot));
        match snapshot {
            None => true,
            Some(snapshot) => snapshot.invalidated_by(params, attribs),
        }
    }

    fn current_epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    fn load_erased(
        &self,
        scope: &TrackingScope,
    ) -> BoxFuture<'static, Result<ErasedResult, LoadError>> {
        let shared = self.get_result(scope);
        async move { shared.await.map(|result| result as ErasedResult) }.boxed()
    }

    fn dependencies(&self) -> Vec<Arc<dyn AnyLoader>> {
        let snapshot = self
            .state
            .lock()
            .cached
            .as_ref()
            .map(|cached| Arc::clone(&cached.snapshot));
        match snapshot {
            None => Vec::new(),
            Some(snapshot) => snapshot
                .loader_uses()
                .into_iter()
                .map(|used| used.loader)
                .collect(),
        }
    }

    fn clean(&self) {
        let trimmed = {
            let mut state = self.state.lock();
            if state.results.len() > 1 {
                state.results.split_off(1)
            } else {
                Vec::new()
            }
        };
        self.free_results(&trimmed);
    }

    fn reset(&self) {
        let (results, _cached) = {
            let mut state = self.state.lock();
            (std::mem::take(&mut state.results), state.cached.take())
        };
        self.free_results(&results);
    }
}

/// Transitively gather the given loaders and everything they currently
/// depend on, keyed by loader identity
///
/// Used by the manager after each transition to compute the active set for
/// generational cleanup.
pub fn collect_affected_loaders(
    roots: &[Arc<dyn AnyLoader>],
    set: &mut HashMap<LoaderId, Arc<dyn AnyLoader>>,
) {
    let mut stack: Vec<Arc<dyn AnyLoader>> = roots.to_vec();
    while let Some(loader) = stack.pop() {
        if set.insert(loader.id(), Arc::clone(&loader)).is_none() {
            stack.extend(loader.dependencies());
        }
    }
}
