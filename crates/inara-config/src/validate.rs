//! Validation helpers and parsing utilities for configuration values.

use std::net::IpAddr;
use std::path::{MAIN_SEPARATOR, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::model::LogFormatSetting;

/// Parse a listener port; zero and values above `u16::MAX` are rejected.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an integer in `1..=65535`.
pub fn parse_port(field: &'static str, raw: &str) -> ConfigResult<u16> {
    let trimmed = raw.trim();
    let port = trimmed
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidField {
            field,
            value: Some(raw.to_string()),
            reason: "not_an_integer",
        })?;
    if port == 0 {
        return Err(ConfigError::InvalidField {
            field,
            value: Some(raw.to_string()),
            reason: "zero",
        });
    }
    u16::try_from(port).map_err(|_| ConfigError::InvalidField {
        field,
        value: Some(raw.to_string()),
        reason: "out_of_range",
    })
}

/// Parse an IPv4 or IPv6 bind address.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBindAddr`] when the value is not an IP literal.
pub fn parse_bind_addr(raw: &str) -> ConfigResult<IpAddr> {
    raw.trim()
        .parse::<IpAddr>()
        .map_err(|_| ConfigError::InvalidBindAddr {
            value: raw.to_string(),
        })
}

/// Parse the output artifact path.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the path is empty or names a directory.
pub fn parse_output_path(field: &'static str, raw: &str) -> ConfigResult<PathBuf> {
    if raw.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            field,
            value: None,
            reason: "empty",
        });
    }
    if raw.ends_with('/') || raw.ends_with(MAIN_SEPARATOR) {
        return Err(ConfigError::InvalidField {
            field,
            value: Some(raw.to_string()),
            reason: "names_directory",
        });
    }
    Ok(PathBuf::from(raw))
}

/// Parse a positive byte count.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a positive integer.
pub fn parse_byte_limit(field: &'static str, raw: &str) -> ConfigResult<usize> {
    let limit = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidField {
            field,
            value: Some(raw.to_string()),
            reason: "not_an_integer",
        })?;
    if limit == 0 {
        return Err(ConfigError::InvalidField {
            field,
            value: Some(raw.to_string()),
            reason: "zero",
        });
    }
    Ok(limit)
}

/// Parse a boolean flag (`1/true/yes/on` or `0/false/no/off`, case-insensitive).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for any other spelling.
pub fn parse_flag(field: &'static str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidField {
            field,
            value: Some(raw.to_string()),
            reason: "not_a_flag",
        }),
    }
}

/// Parse a log output format name.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidLogFormat`] for names other than `json` or `pretty`.
pub fn parse_log_format(raw: &str) -> ConfigResult<LogFormatSetting> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(LogFormatSetting::Json),
        "pretty" => Ok(LogFormatSetting::Pretty),
        _ => Err(ConfigError::InvalidLogFormat {
            value: raw.to_string(),
        }),
    }
}

/// Parse a non-empty log filter directive.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the directive is blank.
pub fn parse_log_level(field: &'static str, raw: &str) -> ConfigResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidField {
            field,
            value: None,
            reason: "empty",
        });
    }
    Ok(trimmed.to_string())
}
