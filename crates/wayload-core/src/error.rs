//! Error types for the loader engine
//!
//! Two layers of outcomes:
//! - [`LoadError`]: what a single loader computation settles with
//! - [`TransitionError`]: what a whole transition reports to the caller
//!
//! Redirects live in both layers because they are control flow, not
//! defects; the manager's judgement step gives them priority over ordinary
//! failures. Every settled outcome is `Clone` so that shared in-flight
//! futures can hand the same result to every consumer.

use std::sync::Arc;
use wayload_route::{RedirectError, RedirectLimitError, RedirectTarget};

/// Outcome of a single loader computation
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    /// The computation requests a corrected navigation
    #[error(transparent)]
    Redirect(#[from] RedirectError),

    /// The computation failed for an ordinary reason
    #[error("loader failed: {0}")]
    Failed(Arc<anyhow::Error>),
}

impl LoadError {
    /// Wrap an ordinary error
    #[must_use]
    pub fn failed(error: impl Into<anyhow::Error>) -> Self {
        Self::Failed(Arc::new(error.into()))
    }

    /// Ordinary failure from a plain message
    #[must_use]
    pub fn message(message: impl std::fmt::Display) -> Self {
        Self::Failed(Arc::new(anyhow::anyhow!("{message}")))
    }

    /// The redirect target, if this is a redirect
    #[must_use]
    pub fn redirect_target(&self) -> Option<&RedirectTarget> {
        match self {
            Self::Redirect(redirect) => Some(&redirect.target),
            Self::Failed(_) => None,
        }
    }
}

impl From<anyhow::Error> for LoadError {
    fn from(error: anyhow::Error) -> Self {
        Self::Failed(Arc::new(error))
    }
}

/// Outcome of one transition, as reported by the manager
///
/// At most one error per transition reaches the caller; the manager picks
/// it by the redirect-first rule and reports the rest as diagnostics.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransitionError {
    /// Re-navigate to the carried target and retry
    #[error(transparent)]
    Redirect(#[from] RedirectError),

    /// Consecutive redirects exceeded the configured limit
    #[error(transparent)]
    RedirectLimit(#[from] RedirectLimitError),

    /// A loader failed for an ordinary reason
    #[error("loader failed: {0}")]
    Loader(Arc<anyhow::Error>),
}

impl TransitionError {
    /// The redirect target, if this is a redirect
    #[must_use]
    pub fn redirect_target(&self) -> Option<&RedirectTarget> {
        match self {
            Self::Redirect(redirect) => Some(&redirect.target),
            _ => None,
        }
    }
}
