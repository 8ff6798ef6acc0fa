//! Transition orchestration and generational cleanup
//!
//! The manager runs one navigation at a time: it builds the transition's
//! tracking scope, initiates every requested loader before awaiting any,
//! lets them all settle, and then judges the outcomes with redirects taking
//! priority over ordinary failures. Across transitions it sweeps loader
//! caches mark-and-sweep style with one generation of grace: loaders
//! reached by the latest transition are trimmed to a single retained
//! result, everything else is fully evicted.

use crate::config::ManagerConfig;
use crate::error::{LoadError, TransitionError};
use crate::loader::{collect_affected_loaders, AnyLoader, ErasedResult, LoaderId};
use crate::tracking::TrackingScope;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use wayload_route::{RedirectError, RedirectLimitError, RouteAttributes, RouteParams};

#[derive(Default)]
struct ManagerState {
    /// Every loader reached by any transition since the last full sweep
    all_loaders: HashMap<LoaderId, Arc<dyn AnyLoader>>,
    /// Loaders reached by the most recently completed transition
    active_loaders: HashSet<LoaderId>,
    /// Consecutive redirect count, reset by a successful transition
    redirect_count: u32,
}

/// Orchestrates transitions over a set of loaders
pub struct Manager {
    config: ManagerConfig,
    state: Mutex<ManagerState>,
}

impl Manager {
    /// Create a manager with the given configuration
    #[inline]
    #[must_use]
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ManagerState::default()),
        }
    }

    /// Run one transition: every requested loader against one shared scope
    ///
    /// Loaders run concurrently with no ordering guarantee between
    /// siblings; all are initiated before any is awaited, and all settle
    /// before the outcome is judged. Results come back in request order.
    ///
    /// # Errors
    /// - [`TransitionError::Redirect`]: re-navigate to the carried target
    ///   and call this again with the corrected inputs
    /// - [`TransitionError::RedirectLimit`]: too many consecutive
    ///   redirects, surface as a terminal navigation failure
    /// - [`TransitionError::Loader`]: an ordinary loader failure
    pub async fn start_transition(
        &self,
        name: &str,
        loaders: &[Arc<dyn AnyLoader>],
        params: RouteParams,
        attribs: RouteAttributes,
    ) -> Result<Vec<ErasedResult>, TransitionError> {
        self.config.debug.emit(&format!("transition to {name}"));
        tracing::debug!(
            target: "wayload",
            transition = name,
            loaders = loaders.len(),
            "starting transition"
        );

        let scope = TrackingScope::new(Arc::new(params), Arc::new(attribs));
        let futures: Vec<_> = loaders
            .iter()
            .map(|loader| loader.load_erased(&scope))
            .collect();
        let settled = futures::future::join_all(futures).await;

        // Generation bookkeeping happens whatever the outcome, so that a
        // loader about to be retried after a redirect is not swept away
        // in between.
        self.mark_active(loaders);

        self.judge(name, settled)
    }

    /// Sweep loader caches after the navigation has completed
    ///
    /// Loaders reached by the latest transition keep exactly one result;
    /// everything else is evicted and forgotten.
    pub fn end_transition(&self) {
        let (retained, evicted) = {
            let mut state = self.state.lock();
            let active = std::mem::take(&mut state.active_loaders);
            let mut retained = Vec::new();
            let mut evicted = Vec::new();
            let mut kept = HashMap::new();
            for (id, loader) in state.all_loaders.drain() {
                if active.contains(&id) {
                    retained.push(Arc::clone(&loader));
                    kept.insert(id, loader);
                } else {
                    evicted.push(loader);
                }
            }
            state.all_loaders = kept;
            state.active_loaders = active;
            (retained, evicted)
        };

        tracing::debug!(
            target: "wayload",
            retained = retained.len(),
            evicted = evicted.len(),
            "ending transition"
        );

        // Free callbacks run outside the manager lock.
        for loader in retained {
            loader.clean();
        }
        for loader in evicted {
            loader.reset();
        }
    }

    /// Number of loaders currently tracked across generations
    #[must_use]
    pub fn tracked_loader_count(&self) -> usize {
        self.state.lock().all_loaders.len()
    }

    /// Number of loaders reached by the most recent transition
    #[must_use]
    pub fn active_loader_count(&self) -> usize {
        self.state.lock().active_loaders.len()
    }

    /// Whether a loader is part of the tracked universe
    #[must_use]
    pub fn is_tracked(&self, id: LoaderId) -> bool {
        self.state.lock().all_loaders.contains_key(&id)
    }

    fn mark_active(&self, loaders: &[Arc<dyn AnyLoader>]) {
        let mut affected = HashMap::new();
        collect_affected_loaders(loaders, &mut affected);

        let mut state = self.state.lock();
        state.active_loaders.clear();
        for (id, loader) in affected {
            state.active_loaders.insert(id);
            state.all_loaders.entry(id).or_insert(loader);
        }
    }

    /// Settle-all-then-judge: pick at most one error for the caller, with
    /// redirects winning over ordinary failures; everything not chosen is
    /// reported as a diagnostic.
    fn judge(
        &self,
        name: &str,
        settled: Vec<Result<ErasedResult, LoadError>>,
    ) -> Result<Vec<ErasedResult>, TransitionError> {
        let mut results = Vec::with_capacity(settled.len());
        let mut chosen_redirect: Option<RedirectError> = None;
        let mut chosen_failure: Option<Arc<anyhow::Error>> = None;
        let mut diagnostics: Vec<String> = Vec::new();

        for outcome in settled {
            match outcome {
                Ok(result) => results.push(result),
                Err(LoadError::Redirect(redirect)) => {
                    if chosen_redirect.is_none() {
                        chosen_redirect = Some(redirect);
                    } else {
                        diagnostics.push(format!("additional redirect: {redirect:?}"));
                    }
                }
                Err(LoadError::Failed(error)) => {
                    if chosen_redirect.is_none() && chosen_failure.is_none() {
                        chosen_failure = Some(error);
                    } else {
                        diagnostics.push(format!("additional loader failure: {error:#}"));
                    }
                }
            }
        }

        // A redirect arriving after an ordinary failure demotes the
        // failure to a diagnostic.
        if chosen_redirect.is_some() {
            if let Some(error) = chosen_failure.take() {
                diagnostics.push(format!("additional loader failure: {error:#}"));
            }
        }
        for diagnostic in &diagnostics {
            self.config.debug.emit(diagnostic);
            tracing::warn!(target: "wayload", transition = name, "{diagnostic}");
        }

        if let Some(redirect) = chosen_redirect {
            let mut state = self.state.lock();
            state.redirect_count += 1;
            if state.redirect_count > self.config.redirect_limit {
                state.redirect_count = 0;
                self.config.debug.emit("redirect limit reached");
                tracing::debug!(target: "wayload", transition = name, "redirect limit reached");
                return Err(TransitionError::RedirectLimit(RedirectLimitError));
            }
            self.config.debug.emit("redirecting");
            tracing::debug!(target: "wayload", transition = name, "redirecting");
            return Err(TransitionError::Redirect(redirect));
        }
        if let Some(error) = chosen_failure {
            return Err(TransitionError::Loader(error));
        }

        self.state.lock().redirect_count = 0;
        Ok(results)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Manager")
            .field("config", &self.config)
            .field("tracked", &state.all_loaders.len())
            .field("active", &state.active_loaders.len())
            .field("redirect_count", &state.redirect_count)
            .finish()
    }
}
