//! Stand-in application server for trying the front door locally.
//!
//! Listens on 127.0.0.1:4000 (the default upstream) and behaves like an
//! SSR dev server: directory-style pages redirect `/docs` to `/docs/`.
//!
//! ```text
//! cargo run --example mock_upstream
//! cargo run
//! curl -i http://localhost:3000/docs
//! ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    routing::get,
    Router,
};
use std::net::SocketAddr;

async fn echo_host(headers: HeaderMap) -> impl IntoResponse {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    let forwarded = headers
        .get("x-forwarded-host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    format!("Hello from the upstream (host: {host}, forwarded host: {forwarded})\n")
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let app = Router::new()
        .route("/", get(echo_host))
        .route("/docs", get(|| async { Redirect::permanent("/docs/") }))
        .route("/docs/", get(|| async { "Docs index\n" }))
        .route("/login", get(|| async { "Login page\n" }))
        .route("/account", get(|| async { Redirect::to("/login") }))
        .route(
            "/boom",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Upstream failure\n") }),
        );

    let addr = SocketAddr::from(([127, 0, 0, 1], 4000));
    println!("Mock upstream listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
