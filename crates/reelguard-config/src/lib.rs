//! Configuration parsing and validation for reelguard
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Tracker budget, cadence and monitored-section markers
//! - Overlay copy
//! - Validation with clear error messages

mod policy;
mod schema;
mod validation;

pub use policy::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Policy> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load configuration if the file exists, otherwise fall back to defaults
pub fn load_config_or_default(path: impl AsRef<Path>) -> ConfigResult<Policy> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(path = %path.display(), "No config file, using defaults");
        return Ok(Policy::default());
    }
    load_config(path)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Policy> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Policy::from_raw(raw))
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;
