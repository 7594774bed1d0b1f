//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Forward decision (verbatim or rewritten path)
//!     → forward.rs (build ForwardingContext, send via hyper-util client)
//!     → headers.rs (Host rewrite, X-Forwarded-*, hop-by-hop stripping)
//!     → redirect.rs (trailing-slash redirect? re-issue once)
//!     → relay response to caller (streamed)
//!
//! Failures:
//!     connect error → 502, timeout → 504 (error.rs)
//! ```
//!
//! # Design Decisions
//! - Exactly one upstream, fixed at startup
//! - Every exchange is tracked (inflight.rs) and released on drop

pub mod error;
pub mod forward;
pub mod headers;
pub mod inflight;
pub mod redirect;
pub mod upstream;

pub use error::ForwardError;
pub use forward::{Forwarder, ForwardingContext};
pub use inflight::InFlightTracker;
pub use upstream::{UpstreamParseError, UpstreamTarget};
