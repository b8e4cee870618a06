//! Environment-driven configuration loading.
//!
//! # Design
//! - Start from compiled defaults and apply overrides one variable at a time.
//! - Resolve variables through an injected lookup so tests never mutate the process environment.
//! - Blank variables are treated as unset.

use tracing::debug;

use crate::error::ConfigResult;
use crate::model::IngestConfig;
use crate::validate::{
    parse_bind_addr, parse_byte_limit, parse_flag, parse_log_format, parse_log_level,
    parse_output_path, parse_port,
};

/// Listener interface override.
pub const ENV_BIND_ADDR: &str = "INARA_BIND_ADDR";
/// Listener port override.
pub const ENV_PORT: &str = "INARA_PORT";
/// Conventional port variable consulted when [`ENV_PORT`] is unset.
pub const ENV_PORT_FALLBACK: &str = "PORT";
/// Output artifact path override.
pub const ENV_OUTPUT_PATH: &str = "INARA_OUTPUT_PATH";
/// Request body limit override.
pub const ENV_MAX_BODY_BYTES: &str = "INARA_MAX_BODY_BYTES";
/// CORS toggle.
pub const ENV_ENABLE_CORS: &str = "INARA_ENABLE_CORS";
/// Fallback log filter.
pub const ENV_LOG_LEVEL: &str = "INARA_LOG_LEVEL";
/// Log output format (`json` or `pretty`).
pub const ENV_LOG_FORMAT: &str = "INARA_LOG_FORMAT";

impl IngestConfig {
    /// Build the configuration from compiled defaults and process environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when any override is present but invalid.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from compiled defaults and overrides resolved by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error when any override is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = read(ENV_BIND_ADDR) {
            config.bind_addr = parse_bind_addr(&raw)?;
        }
        if let Some(raw) = read(ENV_PORT) {
            config.port = parse_port("port", &raw)?;
        } else if let Some(raw) = read(ENV_PORT_FALLBACK) {
            config.port = parse_port("port", &raw)?;
        }
        if let Some(raw) = read(ENV_OUTPUT_PATH) {
            config.output_path = parse_output_path("output_path", &raw)?;
        }
        if let Some(raw) = read(ENV_MAX_BODY_BYTES) {
            config.max_body_bytes = parse_byte_limit("max_body_bytes", &raw)?;
        }
        if let Some(raw) = read(ENV_ENABLE_CORS) {
            config.cors = parse_flag("cors", &raw)?;
        }
        if let Some(raw) = read(ENV_LOG_LEVEL) {
            config.logging.level = parse_log_level("log_level", &raw)?;
        }
        if let Some(raw) = read(ENV_LOG_FORMAT) {
            config.logging.format = Some(parse_log_format(&raw)?);
        }

        debug!(
            addr = %config.socket_addr(),
            output_path = %config.output_path.display(),
            max_body_bytes = config.max_body_bytes,
            cors = config.cors,
            "resolved ingest configuration"
        );
        Ok(config)
    }
}
