//! The read interface loaders observe route inputs through
//!
//! Every typed accessor funnels through one algorithm ([`Scope::read_param`]
//! internally): fetch the raw values, apply the sanitizer per value, and on
//! anything invalid or redundant raise a [`RedirectError`] carrying the
//! corrected values. Corrections are never applied silently; they always
//! surface as a redirect so the corrected state becomes the visible,
//! linkable navigation.
//!
//! Absence semantics are asymmetric between sources: a query name that is
//! absent (or loses all its values to sanitization) with a fallback
//! configured redirects to the fallback, and with no fallback redirects to
//! remove the name when values were present but invalid. A path name never
//! redirects on total absence; it simply reads as no-value.

use std::sync::Arc;
use wayload_route::{
    sane_string, AttributeValue, InvalidParam, ParamSource, RedirectError, RouteParamValues,
    Sanitize,
};

/// Read-only, validated access to the inputs of one navigation
///
/// Implementors supply the raw value lookup (and record every consulted
/// name as a dependency, including on reads that end in a redirect); the
/// trait supplies the sanitization funnel on top.
pub trait Scope {
    /// Raw values of a parameter, `None` when the name is absent
    ///
    /// Implementations record the name as a dependency unconditionally,
    /// because the decision to redirect is itself a function of the input.
    fn raw_param_values(&self, source: ParamSource, name: &str) -> Option<RouteParamValues>;

    /// Raw attribute value, recorded as a dependency unconditionally
    fn raw_attribute(&self, name: &str) -> Option<AttributeValue>;

    /// Sanitized single query parameter value
    ///
    /// Redundant multi-values redirect down to the first occurrence; an
    /// absent or fully-discarded value with a fallback redirects to the
    /// fallback, and without one reads as `None`.
    ///
    /// # Errors
    /// [`RedirectError`] when the value must be corrected first.
    fn query_param<T, S>(
        &self,
        name: &str,
        sanitizer: S,
        fallback: Option<&str>,
    ) -> Result<Option<T>, RedirectError>
    where
        S: Sanitize<T>,
        Self: Sized,
    {
        let fallback: Vec<String> = fallback.map(String::from).into_iter().collect();
        let values = read_param(self, ParamSource::Query, name, sanitizer, fallback, false)?;
        Ok(values.into_iter().next())
    }

    /// Sanitized values of all query parameters with the given name
    ///
    /// An empty `fallback` slice means no fallback.
    ///
    /// # Errors
    /// [`RedirectError`] when the values must be corrected first.
    fn query_params<T, S>(
        &self,
        name: &str,
        sanitizer: S,
        fallback: &[&str],
    ) -> Result<Vec<T>, RedirectError>
    where
        S: Sanitize<T>,
        Self: Sized,
    {
        let fallback: Vec<String> = fallback.iter().map(|v| (*v).to_string()).collect();
        read_param(self, ParamSource::Query, name, sanitizer, fallback, true)
    }

    /// Sanitized single path parameter value
    ///
    /// Path parameters never redirect on total absence, with or without a
    /// fallback; absence reads as `None`.
    ///
    /// # Errors
    /// [`RedirectError`] when a present value must be corrected first.
    fn path_param<T, S>(
        &self,
        name: &str,
        sanitizer: S,
        fallback: Option<&str>,
    ) -> Result<Option<T>, RedirectError>
    where
        S: Sanitize<T>,
        Self: Sized,
    {
        let fallback: Vec<String> = fallback.map(String::from).into_iter().collect();
        let values = read_param(self, ParamSource::Path, name, sanitizer, fallback, false)?;
        Ok(values.into_iter().next())
    }

    /// Sanitized values of all path parameters with the given name
    ///
    /// # Errors
    /// [`RedirectError`] when present values must be corrected first.
    fn path_params<T, S>(
        &self,
        name: &str,
        sanitizer: S,
        fallback: &[&str],
    ) -> Result<Vec<T>, RedirectError>
    where
        S: Sanitize<T>,
        Self: Sized,
    {
        let fallback: Vec<String> = fallback.iter().map(|v| (*v).to_string()).collect();
        read_param(self, ParamSource::Path, name, sanitizer, fallback, true)
    }

    /// Single query parameter as a plain string
    ///
    /// # Errors
    /// [`RedirectError`] on redundant multi-values.
    fn query_value(&self, name: &str) -> Result<Option<String>, RedirectError>
    where
        Self: Sized,
    {
        self.query_param(name, sane_string, None)
    }

    /// Single path parameter as a plain string
    ///
    /// # Errors
    /// [`RedirectError`] on redundant multi-values.
    fn path_value(&self, name: &str) -> Result<Option<String>, RedirectError>
    where
        Self: Sized,
    {
        self.path_param(name, sane_string, None)
    }

    /// Typed attribute value, `None` on absence or type mismatch
    fn attribute<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.raw_attribute(name)
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Remove all query parameters with the given name via redirect
    ///
    /// A no-op when no value is present, but still recorded as a
    /// dependency.
    ///
    /// # Errors
    /// [`RedirectError`] removing the name when any value is present.
    fn remove_query_params(&self, name: &str) -> Result<(), RedirectError> {
        match self.raw_param_values(ParamSource::Query, name) {
            Some(values) if !values.is_empty() => Err(RedirectError::fix_param(
                ParamSource::Query,
                name,
                Vec::new(),
            )),
            _ => Ok(()),
        }
    }
}

/// The sanitization funnel shared by every typed accessor
fn read_param<T, S>(
    scope: &impl Scope,
    source: ParamSource,
    name: &str,
    sanitizer: S,
    fallback: Vec<String>,
    multi: bool,
) -> Result<Vec<T>, RedirectError>
where
    S: Sanitize<T>,
{
    let raw = scope.raw_param_values(source, name).unwrap_or_default();

    if raw.is_empty() {
        // Total absence: query-with-fallback redirects, path never does.
        if !fallback.is_empty() && source == ParamSource::Query {
            return Err(RedirectError::fix_param(source, name, fallback));
        }
        return Ok(Vec::new());
    }

    // A present empty string is a value like any other, only an absent or
    // empty sequence counts as missing.
    let mut outputs = Vec::with_capacity(raw.len());
    let mut survivors: Vec<String> = Vec::with_capacity(raw.len());
    let mut rejected = false;

    for input in &raw {
        match sanitizer.sanitize(input) {
            Ok(output) => {
                outputs.push(output);
                survivors.push(input.clone());
            }
            Err(InvalidParam { replacement }) => {
                rejected = true;
                if let Some(corrected) = replacement {
                    survivors.push(corrected);
                }
            }
        }
    }

    if rejected {
        if survivors.is_empty() {
            if !fallback.is_empty() {
                return Err(RedirectError::fix_param(source, name, fallback));
            }
            return match source {
                // Strip the invalid values from the visible location.
                ParamSource::Query => {
                    Err(RedirectError::fix_param(source, name, Vec::new()))
                }
                ParamSource::Path => Ok(Vec::new()),
            };
        }
        let mut corrected = survivors;
        if !multi {
            corrected.truncate(1);
        }
        return Err(RedirectError::fix_param(source, name, corrected));
    }

    if !multi && raw.len() > 1 {
        // Redundant values collapse to the first occurrence, via redirect.
        return Err(RedirectError::fix_param(source, name, vec![raw[0].clone()]));
    }

    Ok(outputs)
}
