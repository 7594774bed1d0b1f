//! The single upstream target.

use axum::http::uri::{Authority, Uri};
use url::Url;

/// Error type for upstream address parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamParseError {
    #[error("invalid upstream address {0:?}")]
    Invalid(String),

    #[error("upstream address {0:?} has no port")]
    MissingPort(String),
}

/// A fixed `(host, port)` endpoint all forwarded traffic goes to.
///
/// Parsed once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    authority: Authority,
    port: u16,
    base_url: Url,
}

impl UpstreamTarget {
    /// Parse `host:port`, optionally prefixed with `http://`.
    pub fn parse(address: &str) -> Result<Self, UpstreamParseError> {
        let trimmed = address.trim();
        let trimmed = trimmed
            .strip_prefix("http://")
            .unwrap_or(trimmed)
            .trim_end_matches('/');

        let authority: Authority = trimmed
            .parse()
            .map_err(|_| UpstreamParseError::Invalid(address.to_string()))?;
        if authority.host().is_empty() || authority.as_str().contains('@') {
            return Err(UpstreamParseError::Invalid(address.to_string()));
        }
        let port = authority
            .port_u16()
            .ok_or_else(|| UpstreamParseError::MissingPort(address.to_string()))?;
        let base_url = Url::parse(&format!("http://{}/", authority.as_str()))
            .map_err(|_| UpstreamParseError::Invalid(address.to_string()))?;

        Ok(Self {
            authority,
            port,
            base_url,
        })
    }

    pub fn host(&self) -> &str {
        self.authority.host()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Origin authority (`host:port`), the value the upstream sees as `Host`.
    pub fn authority(&self) -> &str {
        self.authority.as_str()
    }

    /// `http://host:port/`, used to resolve redirect locations.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute-form URI for a path-and-query on this upstream.
    pub fn uri_for(&self, path_and_query: &str) -> Result<Uri, axum::http::Error> {
        Uri::builder()
            .scheme("http")
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }

    /// Returns true if `url` points at this upstream's origin.
    pub fn is_origin_of(&self, url: &Url) -> bool {
        url.scheme() == self.base_url.scheme()
            && url.host_str().map(str::to_ascii_lowercase)
                == self.base_url.host_str().map(str::to_ascii_lowercase)
            && url.port_or_known_default() == Some(self.port)
    }
}

impl std::fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.authority())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let target = UpstreamTarget::parse("localhost:4000").unwrap();
        assert_eq!(target.host(), "localhost");
        assert_eq!(target.port(), 4000);
        assert_eq!(target.authority(), "localhost:4000");
        assert_eq!(target.base_url().as_str(), "http://localhost:4000/");

        let target = UpstreamTarget::parse("http://127.0.0.1:4200/").unwrap();
        assert_eq!(target.authority(), "127.0.0.1:4200");
    }

    #[test]
    fn rejects_missing_port_and_garbage() {
        assert_eq!(
            UpstreamTarget::parse("localhost").unwrap_err(),
            UpstreamParseError::MissingPort("localhost".into())
        );
        assert!(UpstreamTarget::parse("").is_err());
        assert!(UpstreamTarget::parse("user@host:80").is_err());
        assert!(UpstreamTarget::parse("bad host:80").is_err());
    }

    #[test]
    fn builds_absolute_uris() {
        let target = UpstreamTarget::parse("localhost:4000").unwrap();
        let uri = target.uri_for("/index.html?lang=en").unwrap();
        assert_eq!(uri.to_string(), "http://localhost:4000/index.html?lang=en");
    }

    #[test]
    fn origin_check_ignores_host_case() {
        let target = UpstreamTarget::parse("LocalHost:4000").unwrap();
        assert!(target.is_origin_of(&Url::parse("http://localhost:4000/a/").unwrap()));
        assert!(!target.is_origin_of(&Url::parse("http://localhost:4001/a/").unwrap()));
        assert!(!target.is_origin_of(&Url::parse("https://localhost:4000/a/").unwrap()));
        assert!(!target.is_origin_of(&Url::parse("http://example.com:4000/").unwrap()));
    }
}
