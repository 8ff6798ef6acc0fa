//! Redirect target merging
//!
//! A redirect carries only the corrections; the retry navigates to the
//! current location with those corrections overlaid. An empty correction
//! sequence removes the name from the location entirely.

use wayload_route::{ParamSource, RedirectTarget, RouteParamMap, RouteParams};

/// Overlay a redirect's corrections onto the params of the navigation that
/// raised it, producing the params to retry with
#[must_use]
pub fn merge_redirect(target: &RedirectTarget, base: &RouteParams) -> RouteParams {
    let mut merged = base.clone();
    for source in [ParamSource::Path, ParamSource::Query] {
        apply(target.map(source), merged.map_mut(source));
    }
    merged
}

fn apply(corrections: &RouteParamMap, map: &mut RouteParamMap) {
    for (name, values) in corrections {
        if values.is_empty() {
            map.shift_remove(name);
        } else {
            map.insert(name.clone(), values.clone());
        }
    }
}
