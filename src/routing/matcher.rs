//! Route rules and prefix matching.
//!
//! # Responsibilities
//! - Define the typed route rule variants
//! - Match a request path against a rule prefix
//!
//! # Design Decisions
//! - Path matching is a case-sensitive string-prefix test: `/api` matches
//!   `/api`, `/api/v1` and `/apix` alike
//! - A rewrite target can only exist on a rewrite rule (enforced by the type)
//! - No regex to guarantee O(n) matching

use crate::config::{RouteConfig, RouteKind};

/// What to do with a request whose path matches a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// Dispatch to the static mount that covers the path.
    Serve,
    /// Never forward; fall through to the local handlers.
    Exclude,
    /// Forward to the upstream with the path unchanged.
    ForwardVerbatim,
    /// Forward to the upstream with the path replaced by `target`.
    ForwardRewritten { target: String },
}

/// A compiled route rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    prefix: PathPrefix,
    action: RouteAction,
}

impl RouteRule {
    pub fn new(prefix: impl Into<String>, action: RouteAction) -> Self {
        Self {
            prefix: PathPrefix::new(prefix),
            action,
        }
    }

    pub fn serve(prefix: impl Into<String>) -> Self {
        Self::new(prefix, RouteAction::Serve)
    }

    pub fn exclude(prefix: impl Into<String>) -> Self {
        Self::new(prefix, RouteAction::Exclude)
    }

    pub fn forward(prefix: impl Into<String>) -> Self {
        Self::new(prefix, RouteAction::ForwardVerbatim)
    }

    pub fn rewrite(prefix: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            prefix,
            RouteAction::ForwardRewritten {
                target: target.into(),
            },
        )
    }

    /// Build from the flat config form.
    ///
    /// Returns `None` for a rewrite rule without a target; validation
    /// rejects such configs before they get here.
    pub fn from_config(config: &RouteConfig) -> Option<Self> {
        let action = match config.action {
            RouteKind::Serve => RouteAction::Serve,
            RouteKind::Exclude => RouteAction::Exclude,
            RouteKind::ForwardVerbatim => RouteAction::ForwardVerbatim,
            RouteKind::ForwardRewritten => RouteAction::ForwardRewritten {
                target: config.rewrite_target.clone()?,
            },
        };
        Some(Self::new(config.prefix.clone(), action))
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    pub fn action(&self) -> &RouteAction {
        &self.action
    }

    /// Returns true if the path falls under this rule's prefix.
    pub fn matches(&self, path: &str) -> bool {
        self.prefix.matches(path)
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefix(String);

impl PathPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.0)
    }
}
