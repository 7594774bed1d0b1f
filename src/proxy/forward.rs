//! Forwarding action.
//!
//! # Responsibilities
//! - Build the upstream request from the inbound one (Host rewrite, path rewrite)
//! - Stream the request body up and the response body back
//! - Enforce connect and response-header timeouts
//! - Resolve trailing-slash redirects (at most one extra hop)
//!
//! # Design Decisions
//! - Single attempt, no retries
//! - No idle pooling: every exchange owns its connection, which closes when
//!   the exchange ends, including when the caller goes away
//! - Upstream error statuses are relayed, not treated as failures

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, HttpBody},
    http::{request::Parts, HeaderMap, Method, Request},
    response::Response,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TimeoutConfig;
use crate::observability::metrics;
use crate::proxy::error::ForwardError;
use crate::proxy::headers::{strip_hop_by_hop, upstream_request_headers};
use crate::proxy::inflight::{InFlightBody, InFlightGuard, InFlightTracker};
use crate::proxy::redirect::trailing_slash_target;
use crate::proxy::upstream::UpstreamTarget;

/// Per-request state carried to the upstream.
#[derive(Debug, Clone)]
pub struct ForwardingContext {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
}

impl ForwardingContext {
    /// Derive the upstream view of an inbound request.
    ///
    /// `rewrite` replaces the path; the query string is kept.
    pub fn new(
        parts: &Parts,
        rewrite: Option<&str>,
        upstream: &UpstreamTarget,
        client_addr: Option<SocketAddr>,
    ) -> Self {
        let path = rewrite.unwrap_or_else(|| parts.uri.path());
        let path_and_query = match parts.uri.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        };

        Self {
            method: parts.method.clone(),
            path_and_query,
            headers: upstream_request_headers(&parts.headers, upstream, client_addr),
        }
    }

    /// Same request, different path-and-query, no body.
    fn redirected(&self, path_and_query: String) -> Self {
        let mut headers = self.headers.clone();
        headers.remove(axum::http::header::CONTENT_LENGTH);
        Self {
            method: self.method.clone(),
            path_and_query,
            headers,
        }
    }
}

/// Sends requests to the single upstream target.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    upstream: Arc<UpstreamTarget>,
    response_timeout: Duration,
    inflight: InFlightTracker,
}

impl Forwarder {
    pub fn new(upstream: Arc<UpstreamTarget>, timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_millis(timeouts.connect_ms)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector);

        Self {
            client,
            upstream,
            response_timeout: Duration::from_millis(timeouts.response_ms),
            inflight: InFlightTracker::new(),
        }
    }

    pub fn upstream(&self) -> &UpstreamTarget {
        &self.upstream
    }

    pub fn inflight(&self) -> &InFlightTracker {
        &self.inflight
    }

    /// Forward a request and return the response to relay to the caller.
    pub async fn forward(
        &self,
        request: Request<Body>,
        rewrite: Option<&str>,
        client_addr: Option<SocketAddr>,
    ) -> Result<Response, ForwardError> {
        let guard = self.inflight.track();
        let (parts, body) = request.into_parts();
        let context = ForwardingContext::new(&parts, rewrite, &self.upstream, client_addr);
        let bodiless = body.size_hint().exact() == Some(0);

        tracing::debug!(
            exchange_id = %guard.id(),
            method = %context.method,
            upstream = %self.upstream,
            path = %context.path_and_query,
            "Forwarding request"
        );

        let response = self.send(&context, body).await?;
        let response = if bodiless {
            self.resolve_trailing_slash_redirect(&context, response).await?
        } else {
            response
        };

        Ok(relay(response, guard))
    }

    /// Re-issue the request once when the upstream only asked for a
    /// trailing-slash variant of the same path.
    async fn resolve_trailing_slash_redirect(
        &self,
        context: &ForwardingContext,
        response: Response<Incoming>,
    ) -> Result<Response<Incoming>, ForwardError> {
        let Some(target) = trailing_slash_target(
            response.status(),
            response.headers(),
            &self.upstream,
            &context.path_and_query,
        ) else {
            return Ok(response);
        };

        tracing::debug!(
            from = %context.path_and_query,
            to = %target,
            status = %response.status(),
            "Resolving trailing-slash redirect"
        );
        drop(response);
        metrics::record_redirect_resolved();

        self.send(&context.redirected(target), Body::empty()).await
    }

    async fn send(
        &self,
        context: &ForwardingContext,
        body: Body,
    ) -> Result<Response<Incoming>, ForwardError> {
        let mut builder = Request::builder()
            .method(context.method.clone())
            .uri(self.upstream.uri_for(&context.path_and_query)?);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(context.headers.clone());
        }
        let request = builder.body(body)?;

        match tokio::time::timeout(self.response_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(source)) if source.is_connect() => Err(ForwardError::Unreachable {
                upstream: self.upstream.to_string(),
                source,
            }),
            Ok(Err(source)) => Err(ForwardError::Exchange {
                upstream: self.upstream.to_string(),
                source,
            }),
            Err(_) => Err(ForwardError::Timeout {
                upstream: self.upstream.to_string(),
                timeout_ms: self.response_timeout.as_millis() as u64,
            }),
        }
    }
}

/// Turn an upstream response into the caller's response, streaming the body.
/// The exchange stays tracked until the body is finished or dropped.
fn relay(response: Response<Incoming>, guard: InFlightGuard) -> Response {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(InFlightBody::new(Body::new(body), guard)))
}
