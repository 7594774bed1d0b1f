//! Front door for a backend + SPA monorepo.
//!
//! Every inbound request is classified by an immutable rule table and then
//! either served by a local handler (static mounts, local API) or forwarded
//! to a single upstream application server, optionally with its path
//! rewritten to an app-shell document.
//!
//! ```text
//!     Client ──▶ http::server ──▶ routing::RuleTable::classify
//!                                      │
//!                    ┌─────────────────┼──────────────────┐
//!                    ▼                 ▼                  ▼
//!             local (Exclude,    local::statics     proxy::Forwarder
//!              Unrouted)            (Serve)      (ForwardVerbatim/Rewritten)
//!                                                         │
//!                                                         ▼
//!                                                      Upstream
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod local;
pub mod proxy;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::FrontDoorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
