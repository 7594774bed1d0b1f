//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::FrontDoorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the listening port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<FrontDoorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<FrontDoorConfig, ConfigError> {
    let config: FrontDoorConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Resolve the listening port from the raw value of `PORT`.
///
/// Unset, non-numeric, out-of-range and zero values all fall back to `default`.
pub fn resolve_port(raw: Option<&str>, default: u16) -> u16 {
    raw.and_then(|v| v.trim().parse::<u16>().ok())
        .filter(|port| *port != 0)
        .unwrap_or(default)
}

/// Apply the process environment on top of a loaded config.
///
/// Reads `PORT` once; called from `main` at startup only.
pub fn apply_env(mut config: FrontDoorConfig) -> FrontDoorConfig {
    let raw = std::env::var(PORT_ENV).ok();
    config.listener.port = resolve_port(raw.as_deref(), config.listener.port);
    config
}
