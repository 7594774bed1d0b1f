//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (staged lookup over the rule table)
//!     → matcher.rs (prefix test per rule)
//!     → Return: Decision (Excluded | Serve | ForwardRewritten | ForwardVerbatim | Unrouted)
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Validate (config::validation)
//!     → Compile typed RouteRule variants
//!     → Freeze as immutable RuleTable
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same path always yields the same decision
//! - Registration order carries no meaning; stage order does

pub mod matcher;
pub mod router;

pub use matcher::{PathPrefix, RouteAction, RouteRule};
pub use router::{Decision, RuleTable};
