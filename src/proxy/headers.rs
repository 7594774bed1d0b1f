//! Header manipulation for forwarded exchanges.
//!
//! # Responsibilities
//! - Rewrite `Host` to the upstream origin
//! - Set X-Forwarded-For, X-Forwarded-Proto, X-Forwarded-Host
//! - Strip hop-by-hop headers in both directions
//!
//! # Design Decisions
//! - Client-supplied X-Forwarded-* values are replaced, never appended
//! - Headers named in `Connection` are treated as hop-by-hop too
//! - X-Request-Id travels to the upstream untouched

use std::net::SocketAddr;

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::proxy::upstream::UpstreamTarget;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Returns true for headers that apply to a single connection only.
pub fn is_hop_by_hop_header(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "proxy-connection"
            | "te"
            | "trailer"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in listed {
        headers.remove(&name);
    }

    let hop: Vec<HeaderName> = headers
        .keys()
        .filter(|name| is_hop_by_hop_header(name.as_str()))
        .cloned()
        .collect();
    for name in hop {
        headers.remove(&name);
    }
}

/// Build the header set sent to the upstream from the inbound headers.
pub fn upstream_request_headers(
    inbound: &HeaderMap,
    upstream: &UpstreamTarget,
    client_addr: Option<SocketAddr>,
) -> HeaderMap {
    let mut headers = inbound.clone();
    strip_hop_by_hop(&mut headers);

    let original_host = headers.remove(header::HOST);

    if let Ok(host) = HeaderValue::from_str(upstream.authority()) {
        headers.insert(header::HOST, host);
    }

    match client_addr.and_then(|addr| HeaderValue::from_str(&addr.ip().to_string()).ok()) {
        Some(ip) => {
            headers.insert(X_FORWARDED_FOR.clone(), ip);
        }
        None => {
            headers.remove(&X_FORWARDED_FOR);
        }
    }
    match original_host {
        Some(host) => {
            headers.insert(X_FORWARDED_HOST.clone(), host);
        }
        None => {
            headers.remove(&X_FORWARDED_HOST);
        }
    }
    headers.insert(X_FORWARDED_PROTO.clone(), HeaderValue::from_static("http"));

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream() -> UpstreamTarget {
        UpstreamTarget::parse("localhost:4000").unwrap()
    }

    #[test]
    fn test_hop_by_hop_header_detection() {
        assert!(is_hop_by_hop_header("Connection"));
        assert!(is_hop_by_hop_header("keep-alive"));
        assert!(is_hop_by_hop_header("TRANSFER-ENCODING"));
        assert!(!is_hop_by_hop_header("Content-Type"));
        assert!(!is_hop_by_hop_header("Authorization"));
    }

    #[test]
    fn strips_headers_named_in_connection() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("close, x-debug"));
        headers.insert("x-debug", HeaderValue::from_static("1"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get("x-debug").is_none());
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "text/html");
    }

    #[test]
    fn rewrites_host_to_upstream_origin() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("example.com"));
        inbound.insert("x-request-id", HeaderValue::from_static("abc"));
        inbound.insert(X_FORWARDED_FOR.clone(), HeaderValue::from_static("6.6.6.6"));

        let addr: SocketAddr = "10.0.0.7:51000".parse().unwrap();
        let headers = upstream_request_headers(&inbound, &upstream(), Some(addr));

        assert_eq!(headers.get(header::HOST).unwrap(), "localhost:4000");
        assert_eq!(headers.get(&X_FORWARDED_HOST).unwrap(), "example.com");
        assert_eq!(headers.get(&X_FORWARDED_FOR).unwrap(), "10.0.0.7");
        assert_eq!(headers.get(&X_FORWARDED_PROTO).unwrap(), "http");
        assert_eq!(headers.get("x-request-id").unwrap(), "abc");
    }

    #[test]
    fn drops_untrusted_forwarded_for_without_peer() {
        let mut inbound = HeaderMap::new();
        inbound.insert(X_FORWARDED_FOR.clone(), HeaderValue::from_static("6.6.6.6"));

        let headers = upstream_request_headers(&inbound, &upstream(), None);

        assert!(headers.get(&X_FORWARDED_FOR).is_none());
        assert!(headers.get(&X_FORWARDED_HOST).is_none());
        assert_eq!(headers.get(header::HOST).unwrap(), "localhost:4000");
    }
}
