//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! compiled-in defaults  or  config file (TOML)
//!     → loader.rs (parse & deserialize, apply PORT)
//!     → validation.rs (semantic checks)
//!     → FrontDoorConfig (validated, immutable)
//!     → passed by reference into HttpServer::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Environment is read once, in `main`, never by the core

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env, load_config, parse_config, resolve_port, ConfigError};
pub use schema::{
    FrontDoorConfig, ListenerConfig, LocalApiConfig, ObservabilityConfig, RouteConfig, RouteKind,
    StaticMountConfig, TimeoutConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
