//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handling produces:
//!     → logging.rs (one visit record per request, structured events)
//!     → metrics.rs (counters, histograms)
//!     → x-request-id header (http::request) correlating both
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows to the upstream and back to the caller
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, log_visit, VISIT_TARGET};
