//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the front door.
//! All types derive Serde traits for deserialization from config files.
//! `FrontDoorConfig::default()` is the compiled-in configuration used when no
//! file is given.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the front door.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FrontDoorConfig {
    /// Listener configuration (bind host, port).
    pub listener: ListenerConfig,

    /// The single upstream all forwarded traffic goes to.
    pub upstream: UpstreamConfig,

    /// Route rules, one per path prefix.
    pub routes: Vec<RouteConfig>,

    /// Locally served static directories.
    pub static_mounts: Vec<StaticMountConfig>,

    /// The backend's own endpoints.
    pub local_api: LocalApiConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for FrontDoorConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            routes: vec![
                RouteConfig::new("/api", RouteKind::Exclude),
                RouteConfig::new("/app-angular-2", RouteKind::Exclude),
                RouteConfig::new("/", RouteKind::ForwardVerbatim),
            ],
            static_mounts: vec![StaticMountConfig {
                prefix: "/app-angular-2".to_string(),
                root: "dist/apps/app-angular-2/browser".to_string(),
                headers: BTreeMap::from([(
                    "X-Custom-Header".to_string(),
                    "app-angular-2".to_string(),
                )]),
                app_shell: true,
            }],
            local_api: LocalApiConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// Default port, used when `PORT` is unset or not a valid port number.
    pub port: u16,
}

impl ListenerConfig {
    /// Bind address in `host:port` form.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "localhost:4000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "localhost:4000".to_string(),
        }
    }
}

/// How a route rule handles matching paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Serve from a local static mount.
    Serve,
    /// Never forward; fall through to local handlers.
    Exclude,
    /// Forward with the path unchanged.
    ForwardVerbatim,
    /// Forward with the path replaced by `rewrite_target`.
    ForwardRewritten,
}

/// Route configuration in its flat, file-friendly form.
///
/// Compiled into a typed [`crate::routing::RouteRule`] after validation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path prefix this rule applies to.
    pub prefix: String,

    /// Handling action.
    pub action: RouteKind,

    /// Replacement path; required for `forward_rewritten`, rejected otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_target: Option<String>,
}

impl RouteConfig {
    pub fn new(prefix: impl Into<String>, action: RouteKind) -> Self {
        Self {
            prefix: prefix.into(),
            action,
            rewrite_target: None,
        }
    }

    pub fn rewrite(prefix: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            action: RouteKind::ForwardRewritten,
            rewrite_target: Some(target.into()),
        }
    }
}

/// A directory served under a URL prefix.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticMountConfig {
    /// URL prefix (e.g., "/app-angular-2").
    pub prefix: String,

    /// Filesystem directory to serve.
    pub root: String,

    /// Headers added to every response from this mount.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Serve `index.html` for paths that match no file.
    #[serde(default = "default_app_shell")]
    pub app_shell: bool,
}

fn default_app_shell() -> bool {
    true
}

/// Local API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocalApiConfig {
    /// Global prefix of the local endpoints.
    pub prefix: String,
}

impl LocalApiConfig {
    /// Address announced at startup: the local API on the bound port.
    pub fn entry_url(&self, port: u16) -> String {
        format!(
            "http://localhost:{port}/{}",
            self.prefix.trim_start_matches('/')
        )
    }
}

impl Default for LocalApiConfig {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
        }
    }
}

/// Timeout configuration for upstream exchanges.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_ms: u64,

    /// Time allowed for the upstream to produce response headers, in milliseconds.
    pub response_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 5_000,
            response_ms: 30_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
