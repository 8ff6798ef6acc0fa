//! Manager configuration
//!
//! Supplied once at construction: the redirect limit and the debug sink.

use std::sync::Arc;

/// Default number of consecutive redirects before a transition fails
pub const DEFAULT_REDIRECT_LIMIT: u32 = 25;

/// Destination for the manager's debug messages
#[derive(Clone, Default)]
pub enum DebugSink {
    /// No debug output
    #[default]
    Disabled,
    /// Log through `tracing::debug!`
    Standard,
    /// Custom textual logging function
    Custom(Arc<dyn Fn(&str) + Send + Sync>),
}

impl DebugSink {
    pub(crate) fn emit(&self, message: &str) {
        match self {
            Self::Disabled => {}
            Self::Standard => tracing::debug!(target: "wayload", "{message}"),
            Self::Custom(log) => log(message),
        }
    }
}

impl std::fmt::Debug for DebugSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "Disabled"),
            Self::Standard => write!(f, "Standard"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Manager configuration
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Maximum consecutive redirects before the transition fails terminally
    pub redirect_limit: u32,
    /// Debug message sink
    pub debug: DebugSink,
}

impl ManagerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a redirect limit
    #[inline]
    #[must_use]
    pub fn with_redirect_limit(mut self, limit: u32) -> Self {
        self.redirect_limit = limit;
        self
    }

    /// With a debug sink
    #[inline]
    #[must_use]
    pub fn with_debug(mut self, debug: DebugSink) -> Self {
        self.debug = debug;
        self
    }

    /// With a custom debug logging function
    #[must_use]
    pub fn with_debug_fn(mut self, log: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.debug = DebugSink::Custom(Arc::new(log));
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
            debug: DebugSink::Disabled,
        }
    }
}
