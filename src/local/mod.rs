//! Local handler registry.
//!
//! # Data Flow
//! ```text
//! Excluded / unrouted request
//!     → statics.rs (longest static mount covering the path)
//!     → api.rs (local API router)
//!     → 404 Not Found
//!
//! Serve request
//!     → statics.rs (longest static mount covering the path)
//!     → 404 Not Found
//! ```
//!
//! # Design Decisions
//! - The registry never forwards; it has no handle on the upstream
//! - Built once at startup, shared read-only

pub mod api;
pub mod statics;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceExt;

use crate::config::FrontDoorConfig;

pub use statics::StaticMount;

pub(crate) fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// Static mounts plus the local API.
#[derive(Debug, Clone)]
pub struct LocalHandlers {
    mounts: Vec<StaticMount>,
    api: Router,
}

impl LocalHandlers {
    pub fn new(mounts: Vec<StaticMount>, api: Router) -> Self {
        Self { mounts, api }
    }

    pub fn from_config(config: &FrontDoorConfig) -> Self {
        let mounts = config
            .static_mounts
            .iter()
            .map(StaticMount::from_config)
            .collect();
        Self::new(mounts, api::router(&config.local_api.prefix))
    }

    pub fn mounts(&self) -> &[StaticMount] {
        &self.mounts
    }

    fn mount_for(&self, path: &str) -> Option<&StaticMount> {
        self.mounts
            .iter()
            .filter(|mount| mount.covers(path))
            .max_by_key(|mount| mount.prefix().len())
    }

    /// Handle a request that must not be forwarded.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        if let Some(mount) = self.mount_for(request.uri().path()) {
            return mount.serve(request).await;
        }
        self.api
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {})
    }

    /// Handle a request routed to the static file handler.
    pub async fn serve_static(&self, request: Request<Body>) -> Response {
        match self.mount_for(request.uri().path()) {
            Some(mount) => mount.serve(request).await,
            None => not_found(),
        }
    }
}
