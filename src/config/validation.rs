//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that rewrite targets exist exactly for rewrite rules
//! - Validate value ranges (timeouts > 0, upstream parses)
//! - Detect duplicate route prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FrontDoorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use axum::http::{HeaderName, HeaderValue};

use crate::config::schema::{FrontDoorConfig, RouteKind};
use crate::proxy::UpstreamTarget;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("route prefix {0:?} must start with '/'")]
    RelativePrefix(String),

    #[error("route prefix {0:?} is declared more than once")]
    DuplicatePrefix(String),

    #[error("route {0:?} forwards rewritten but has no rewrite_target")]
    MissingRewriteTarget(String),

    #[error("route {0:?} has a rewrite_target but does not rewrite")]
    UnexpectedRewriteTarget(String),

    #[error("rewrite target {0:?} must start with '/'")]
    RelativeRewriteTarget(String),

    #[error("upstream address {0:?} is not a valid host:port")]
    InvalidUpstream(String),

    #[error("static mount {0:?} must have a prefix starting with '/' and a non-empty root")]
    InvalidMount(String),

    #[error("static mount {mount:?} has an invalid header {name:?}")]
    InvalidMountHeader { mount: String, name: String },

    #[error("local api prefix {0:?} must start with '/'")]
    InvalidLocalApiPrefix(String),

    #[error("timeout {0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &FrontDoorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for route in &config.routes {
        if !route.prefix.starts_with('/') {
            errors.push(ValidationError::RelativePrefix(route.prefix.clone()));
        }
        if !seen.insert(route.prefix.as_str()) {
            errors.push(ValidationError::DuplicatePrefix(route.prefix.clone()));
        }
        match (route.action, route.rewrite_target.as_deref()) {
            (RouteKind::ForwardRewritten, None) => {
                errors.push(ValidationError::MissingRewriteTarget(route.prefix.clone()));
            }
            (RouteKind::ForwardRewritten, Some(target)) if !target.starts_with('/') => {
                errors.push(ValidationError::RelativeRewriteTarget(target.to_string()));
            }
            (RouteKind::ForwardRewritten, Some(_)) => {}
            (_, Some(_)) => {
                errors.push(ValidationError::UnexpectedRewriteTarget(route.prefix.clone()));
            }
            (_, None) => {}
        }
    }

    if UpstreamTarget::parse(&config.upstream.address).is_err() {
        errors.push(ValidationError::InvalidUpstream(config.upstream.address.clone()));
    }

    for mount in &config.static_mounts {
        if !mount.prefix.starts_with('/') || mount.root.trim().is_empty() {
            errors.push(ValidationError::InvalidMount(mount.prefix.clone()));
        }
        for (name, value) in &mount.headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err()
                || HeaderValue::from_str(value).is_err()
            {
                errors.push(ValidationError::InvalidMountHeader {
                    mount: mount.prefix.clone(),
                    name: name.clone(),
                });
            }
        }
    }

    if !config.local_api.prefix.starts_with('/') {
        errors.push(ValidationError::InvalidLocalApiPrefix(
            config.local_api.prefix.clone(),
        ));
    }

    if config.timeouts.connect_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_ms"));
    }
    if config.timeouts.response_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("response_ms"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
