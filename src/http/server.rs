//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (request ID, tracing)
//! - Classify each request and run exactly one action
//! - Bind server to listener with graceful shutdown

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{validate_config, ConfigError, FrontDoorConfig, ValidationError};
use crate::http::request::{request_id, UuidRequestId};
use crate::local::LocalHandlers;
use crate::observability::{log_visit, metrics};
use crate::proxy::{Forwarder, InFlightTracker, UpstreamTarget};
use crate::routing::{Decision, RuleTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub rules: Arc<RuleTable>,
    pub local: Arc<LocalHandlers>,
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the front door.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Validate the configuration and build every subsystem from it.
    pub fn new(config: &FrontDoorConfig) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let upstream = UpstreamTarget::parse(&config.upstream.address).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidUpstream(
                config.upstream.address.clone(),
            )])
        })?;

        let state = AppState {
            rules: Arc::new(RuleTable::from_config(&config.routes)),
            local: Arc::new(LocalHandlers::from_config(config)),
            forwarder: Arc::new(Forwarder::new(Arc::new(upstream), &config.timeouts)),
        };

        tracing::info!(
            upstream = %state.forwarder.upstream(),
            rules = state.rules.rules().len(),
            static_mounts = state.local.mounts().len(),
            "Router configured"
        );

        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// A clone of the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Tracker of upstream exchanges still in flight.
    pub fn inflight(&self) -> &InFlightTracker {
        self.state.forwarder.inflight()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let inflight = self.inflight().clone();
        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!(
            in_flight = inflight.active_count(),
            "HTTP server stopped"
        );
        Ok(())
    }
}

/// Main dispatch handler.
/// Classifies the path, records the visit, and runs exactly one action.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let decision = state.rules.classify(&path);
    log_visit(method.as_str(), &path, &decision, request_id(&request));

    let response = match decision {
        Decision::Excluded | Decision::Unrouted => state.local.dispatch(request).await,
        Decision::Serve => state.local.serve_static(request).await,
        Decision::ForwardRewritten { target } => {
            forward(&state, request, Some(target), client_addr).await
        }
        Decision::ForwardVerbatim => forward(&state, request, None, client_addr).await,
    };

    metrics::record_request(
        method.as_str(),
        response.status().as_u16(),
        decision.label(),
        start_time,
    );
    response
}

async fn forward(
    state: &AppState,
    request: Request<Body>,
    rewrite: Option<&str>,
    client_addr: Option<SocketAddr>,
) -> Response {
    let request_id = request_id(&request).map(str::to_owned);
    match state.forwarder.forward(request, rewrite, client_addr).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                request_id = request_id.as_deref().unwrap_or("-"),
                error = %e,
                "Upstream request failed"
            );
            metrics::record_upstream_error(e.kind());
            e.into_response()
        }
    }
}
