//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Emit the per-request visit record
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level
//! - Visit records use their own target so they can be filtered separately

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::routing::Decision;

/// Tracing target of the per-request visit record.
pub const VISIT_TARGET: &str = "front_door::visit";

/// Default filter directives for a configured level.
pub fn default_directives(level: &str) -> String {
    format!("front_door={level},tower_http={level}")
}

/// Initialize the global subscriber. Call once, from `main`.
pub fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Record one inbound request. Called exactly once per request, after the
/// routing decision and before the action runs.
pub fn log_visit(method: &str, path: &str, decision: &Decision<'_>, request_id: Option<&str>) {
    tracing::info!(
        target: VISIT_TARGET,
        method,
        path,
        decision = %decision,
        request_id = request_id.unwrap_or("-"),
        "Visited URL"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_crate_and_tower_http() {
        assert_eq!(default_directives("debug"), "front_door=debug,tower_http=debug");
        assert!(default_directives("info").parse::<EnvFilter>().is_ok());
    }
}
