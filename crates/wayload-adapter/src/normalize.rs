//! Raw route value normalization
//!
//! Navigation frameworks hand over parameter values in loose shapes: a
//! single value, a list, nulls for valueless occurrences. The engine wants
//! one canonical shape: every name maps to an ordered sequence of strings,
//! with nulls dropped.

use wayload_route::{RouteParamMap, RouteParamValues};

/// Normalize one raw value sequence, dropping valueless occurrences
#[must_use]
pub fn normalize_param_value<I, S>(input: I) -> RouteParamValues
where
    I: IntoIterator<Item = Option<S>>,
    S: Into<String>,
{
    input.into_iter().flatten().map(Into::into).collect()
}

/// Normalize a whole raw parameter mapping
#[must_use]
pub fn normalize_params<M, N, I, S>(input: M) -> RouteParamMap
where
    M: IntoIterator<Item = (N, I)>,
    N: Into<String>,
    I: IntoIterator<Item = Option<S>>,
    S: Into<String>,
{
    input
        .into_iter()
        .map(|(name, values)| (name.into(), normalize_param_value(values)))
        .collect()
}
