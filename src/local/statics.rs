//! Static directory mounts.
//!
//! # Responsibilities
//! - Serve files from a directory under a URL prefix
//! - Fall back to the mount's `index.html` for client-side routes
//! - Attach the mount's fixed response headers to served files
//!
//! # Design Decisions
//! - Mount prefixes match on segment boundaries (`/app` covers `/app/x`, not `/apple`)
//! - The prefix is stripped before the path reaches `ServeDir`
//! - Headers are only added to successful responses
//! - Redirects issued by `ServeDir` get the prefix back on their `Location`

use std::convert::Infallible;
use std::path::Path;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, Uri},
    response::Response,
};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::StaticMountConfig;
use crate::local::not_found;

#[derive(Debug, Clone)]
enum StaticService {
    AppShell(ServeDir<ServeFile>),
    Files(ServeDir),
}

/// A directory served under a URL prefix.
#[derive(Debug, Clone)]
pub struct StaticMount {
    prefix: String,
    service: StaticService,
    headers: HeaderMap,
}

impl StaticMount {
    /// Mount `root` at `prefix`. With `app_shell`, unknown paths get `index.html`.
    pub fn new(prefix: &str, root: impl AsRef<Path>, headers: HeaderMap, app_shell: bool) -> Self {
        let root = root.as_ref();
        let service = if app_shell {
            StaticService::AppShell(
                ServeDir::new(root).fallback(ServeFile::new(root.join("index.html"))),
            )
        } else {
            StaticService::Files(ServeDir::new(root))
        };

        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
            service,
            headers,
        }
    }

    pub fn from_config(config: &StaticMountConfig) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(mount = %config.prefix, header = %name, "Ignoring invalid mount header"),
            }
        }
        Self::new(&config.prefix, &config.root, headers, config.app_shell)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if the path lies under this mount.
    pub fn covers(&self, path: &str) -> bool {
        path.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Serve a request whose path lies under this mount.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let (mut parts, body) = request.into_parts();
        match self.strip_prefix(&parts.uri) {
            Some(uri) => parts.uri = uri,
            None => return not_found(),
        }
        let request = Request::from_parts(parts, body);

        let result: Result<Response, Infallible> = match &self.service {
            StaticService::AppShell(service) => service
                .clone()
                .oneshot(request)
                .await
                .map(|response| response.map(Body::new)),
            StaticService::Files(service) => service
                .clone()
                .oneshot(request)
                .await
                .map(|response| response.map(Body::new)),
        };
        let mut response = result.unwrap_or_else(|never| match never {});

        if response.status().is_success() {
            for (name, value) in &self.headers {
                response.headers_mut().insert(name.clone(), value.clone());
            }
        } else if response.status().is_redirection() {
            self.restore_location(response.headers_mut());
        }
        response
    }

    /// `ServeDir` only saw the stripped path, so its redirects point outside the mount.
    fn restore_location(&self, headers: &mut HeaderMap) {
        let Some(location) = headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .filter(|location| location.starts_with('/'))
        else {
            return;
        };
        if let Ok(value) = HeaderValue::from_str(&format!("{}{location}", self.prefix)) {
            headers.insert(header::LOCATION, value);
        }
    }

    fn strip_prefix(&self, uri: &Uri) -> Option<Uri> {
        let rest = uri.path().strip_prefix(self.prefix.as_str())?;
        let rest = if rest.is_empty() { "/" } else { rest };
        let path_and_query = match uri.query() {
            Some(query) => format!("{rest}?{query}"),
            None => rest.to_string(),
        };
        path_and_query.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_on_segment_boundaries() {
        let mount = StaticMount::new("/app", "dist", HeaderMap::new(), false);
        assert!(mount.covers("/app"));
        assert!(mount.covers("/app/main.js"));
        assert!(!mount.covers("/apple"));
        assert!(!mount.covers("/"));

        let root = StaticMount::new("/", "dist", HeaderMap::new(), false);
        assert_eq!(root.prefix(), "");
        assert!(root.covers("/anything"));
    }

    #[test]
    fn strips_prefix_and_keeps_query() {
        let mount = StaticMount::new("/app/", "dist", HeaderMap::new(), false);
        let uri: Uri = "/app/js/main.js?v=3".parse().unwrap();
        assert_eq!(mount.strip_prefix(&uri).unwrap(), "/js/main.js?v=3");

        let uri: Uri = "/app".parse().unwrap();
        assert_eq!(mount.strip_prefix(&uri).unwrap(), "/");
    }

    #[test]
    fn redirect_location_gets_prefix_back() {
        let mount = StaticMount::new("/app", "dist", HeaderMap::new(), false);
        let mut headers = HeaderMap::new();
        headers.insert(header::LOCATION, HeaderValue::from_static("/sub/?v=1"));
        mount.restore_location(&mut headers);
        assert_eq!(headers[header::LOCATION], "/app/sub/?v=1");

        let mut headers = HeaderMap::new();
        headers.insert(header::LOCATION, HeaderValue::from_static("http://elsewhere/"));
        mount.restore_location(&mut headers);
        assert_eq!(headers[header::LOCATION], "http://elsewhere/");
    }
}
