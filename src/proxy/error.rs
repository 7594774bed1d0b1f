use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures of a forwarded exchange.
///
/// The `Display` text is for logs only; responses carry a fixed body.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("upstream {upstream} unreachable: {source}")]
    Unreachable {
        upstream: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("upstream {upstream} did not respond within {timeout_ms} ms")]
    Timeout { upstream: String, timeout_ms: u64 },

    #[error("upstream {upstream} exchange failed: {source}")]
    Exchange {
        upstream: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("could not build upstream request: {0}")]
    InvalidRequest(#[from] axum::http::Error),
}

impl ForwardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForwardError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::Unreachable { .. }
            | ForwardError::Exchange { .. }
            | ForwardError::InvalidRequest(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::Unreachable { .. } => "unreachable",
            ForwardError::Timeout { .. } => "timeout",
            ForwardError::Exchange { .. } => "exchange",
            ForwardError::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = status.canonical_reason().unwrap_or("Bad Gateway");
        (status, body).into_response()
    }
}
