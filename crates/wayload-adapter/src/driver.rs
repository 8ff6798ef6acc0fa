//! Transition driver
//!
//! The engine reports a redirect as an error and expects the caller to
//! retry with corrected inputs. This driver is that retry loop: it keeps
//! merging redirect targets into the location and re-running the
//! transition until it either completes, exhausts the redirect limit, or
//! fails for an ordinary reason. On completion it runs the end-of-
//! transition sweep, mirroring a router's after-navigation hook.

use crate::merge::merge_redirect;
use std::sync::Arc;
use wayload_core::{AnyLoader, ErasedResult, Manager, TransitionError};
use wayload_route::{RouteAttributes, RouteParams};

/// Run one transition to completion, following redirects
///
/// Redirects are followed invisibly, re-merged into `params` each round;
/// the final resolved params are returned alongside the results so the
/// caller can reflect them in the visible location.
///
/// # Errors
/// [`TransitionError::RedirectLimit`] or [`TransitionError::Loader`]; a
/// plain `Redirect` never escapes this loop.
pub async fn resolve_transition(
    manager: &Manager,
    name: &str,
    loaders: &[Arc<dyn AnyLoader>],
    mut params: RouteParams,
    attribs: RouteAttributes,
) -> Result<(Vec<ErasedResult>, RouteParams), TransitionError> {
    loop {
        match manager
            .start_transition(name, loaders, params.clone(), attribs.clone())
            .await
        {
            Ok(results) => {
                manager.end_transition();
                return Ok((results, params));
            }
            Err(TransitionError::Redirect(redirect)) => {
                params = merge_redirect(&redirect.target, &params);
            }
            Err(other) => return Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayload_core::{Loader, Scope};
    use wayload_route::sane_string;

    #[tokio::test]
    async fn follows_fallback_redirect_to_completion() {
        let loader = Loader::new(|scope, _previous: Option<Arc<String>>| async move {
            Ok(scope
                .query_param("q", sane_string, Some("default"))?
                .unwrap_or_default())
        });
        let loaders: Vec<Arc<dyn AnyLoader>> = vec![loader];

        let manager = Manager::default();
        let (results, params) = resolve_transition(
            &manager,
            "search",
            &loaders,
            RouteParams::new(),
            RouteAttributes::new(),
        )
        .await
        .unwrap();

        assert_eq!(*results[0].clone().downcast::<String>().unwrap(), "default");
        // The corrected value is reflected in the resolved location.
        assert_eq!(params.query["q"], vec!["default".to_string()]);
    }

    #[tokio::test]
    async fn removal_redirect_settles_in_one_round() {
        let loader = Loader::new(|scope, _previous: Option<Arc<String>>| async move {
            scope.remove_query_params("legacy")?;
            Ok("done".to_string())
        });
        let loaders: Vec<Arc<dyn AnyLoader>> = vec![loader];

        let manager = Manager::default();
        let (_, params) = resolve_transition(
            &manager,
            "cleanup",
            &loaders,
            RouteParams::new().with_query("legacy", ["x"]),
            RouteAttributes::new(),
        )
        .await
        .unwrap();

        assert!(!params.query.contains_key("legacy"));
    }
}
