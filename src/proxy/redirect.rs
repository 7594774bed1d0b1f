//! Trailing-slash redirect detection.
//!
//! SSR upstreams answer `GET /dir` with a redirect to `/dir/`. The front door
//! resolves exactly that redirect itself so callers never see it. Any other
//! redirect is relayed to the caller unchanged.

use axum::http::{header, HeaderMap, StatusCode};

use crate::proxy::upstream::UpstreamTarget;

/// Statuses treated as redirects.
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// If the response is a redirect whose target differs from `requested` only by
/// one trailing `/`, return the target's path-and-query on the upstream.
///
/// `requested` is the path-and-query that was sent to the upstream. Relative
/// locations resolve against it; absolute ones must point at the upstream.
pub fn trailing_slash_target(
    status: StatusCode,
    headers: &HeaderMap,
    upstream: &UpstreamTarget,
    requested: &str,
) -> Option<String> {
    if !is_redirect(status) {
        return None;
    }

    let location = headers.get(header::LOCATION)?.to_str().ok()?;
    let requested = upstream.base_url().join(requested).ok()?;
    let target = requested.join(location).ok()?;

    if !upstream.is_origin_of(&target) || target.query() != requested.query() {
        return None;
    }
    if !differs_by_trailing_slash(requested.path(), target.path()) {
        return None;
    }

    let mut path_and_query = target.path().to_string();
    if let Some(query) = target.query() {
        path_and_query.push('?');
        path_and_query.push_str(query);
    }
    Some(path_and_query)
}

fn differs_by_trailing_slash(a: &str, b: &str) -> bool {
    b.strip_suffix('/') == Some(a) || a.strip_suffix('/') == Some(b)
}
