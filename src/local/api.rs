//! The backend's own endpoints, mounted under the local API prefix.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::local::not_found;

/// Build the local API router. Anything it does not know is a 404.
pub fn router(prefix: &str) -> Router {
    let base = prefix.trim_end_matches('/');
    let index = if base.is_empty() { "/" } else { base };

    Router::new()
        .route(index, get(get_data))
        .route(&format!("{base}/health"), get(health))
        .fallback(|| async { not_found() })
}

async fn get_data() -> Json<Value> {
    Json(json!({ "message": "Hello API" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
