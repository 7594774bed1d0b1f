//! Route lookup and dispatch decision.
//!
//! # Responsibilities
//! - Store compiled route rules
//! - Classify a request path into exactly one decision
//! - Return an explicit `Unrouted` decision when no rule matches
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scan per stage (rule sets are small)
//! - Stage order is fixed: Exclude, Serve, ForwardRewritten, ForwardVerbatim
//! - Within the rewrite stage the longest matching prefix wins

use std::fmt;

use crate::config::RouteConfig;
use crate::routing::matcher::{RouteAction, RouteRule};

/// The outcome of classifying one request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    /// Matched an `Exclude` rule: local handlers only.
    Excluded,
    /// Matched a `Serve` rule: local static mount.
    Serve,
    /// Matched a `ForwardRewritten` rule: forward to `target`.
    ForwardRewritten { target: &'a str },
    /// Matched a `ForwardVerbatim` rule: forward unchanged.
    ForwardVerbatim,
    /// Matched nothing: local handlers, else not found.
    Unrouted,
}

impl Decision<'_> {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Excluded => "excluded",
            Decision::Serve => "serve",
            Decision::ForwardRewritten { .. } => "forward_rewritten",
            Decision::ForwardVerbatim => "forward_verbatim",
            Decision::Unrouted => "unrouted",
        }
    }
}

impl fmt::Display for Decision<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable, compiled rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<RouteRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        let table = Self { rules };
        if !table.has_catch_all() {
            tracing::warn!("No catch-all forward rule; unmatched paths are served locally");
        }
        table
    }

    /// Compile validated route configs into a table.
    pub fn from_config(routes: &[RouteConfig]) -> Self {
        let rules = routes
            .iter()
            .filter_map(|route| {
                let rule = RouteRule::from_config(route);
                if rule.is_none() {
                    tracing::warn!(prefix = %route.prefix, "Skipping rewrite rule without target");
                }
                rule
            })
            .collect();
        Self::new(rules)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Returns true if some forward rule matches every path.
    pub fn has_catch_all(&self) -> bool {
        self.rules.iter().any(|rule| {
            rule.prefix() == "/"
                && matches!(
                    rule.action(),
                    RouteAction::ForwardVerbatim | RouteAction::ForwardRewritten { .. }
                )
        })
    }

    /// Returns true if the path falls under any `Exclude` rule.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.rules
            .iter()
            .any(|rule| *rule.action() == RouteAction::Exclude && rule.matches(path))
    }

    /// Classify a path. Pure: depends only on `path` and the table.
    pub fn classify<'a>(&'a self, path: &str) -> Decision<'a> {
        if self.is_excluded(path) {
            return Decision::Excluded;
        }

        if self
            .rules
            .iter()
            .any(|rule| *rule.action() == RouteAction::Serve && rule.matches(path))
        {
            return Decision::Serve;
        }

        let rewrite = self
            .rules
            .iter()
            .filter(|rule| rule.matches(path))
            .filter_map(|rule| match rule.action() {
                RouteAction::ForwardRewritten { target } => {
                    Some((rule.prefix().len(), target.as_str()))
                }
                _ => None,
            })
            .max_by_key(|(len, _)| *len);
        if let Some((_, target)) = rewrite {
            return Decision::ForwardRewritten { target };
        }

        if self
            .rules
            .iter()
            .any(|rule| *rule.action() == RouteAction::ForwardVerbatim && rule.matches(path))
        {
            return Decision::ForwardVerbatim;
        }

        Decision::Unrouted
    }
}
