//! Typed configuration models.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Runtime settings for the ingest listener and its output artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Interface the listener binds to.
    pub bind_addr: IpAddr,
    /// TCP port the listener binds to.
    pub port: u16,
    /// File replaced on every successful ingest.
    pub output_path: PathBuf,
    /// Upper bound on the declared request body length.
    pub max_body_bytes: usize,
    /// Whether permissive CORS headers and preflight handling are enabled.
    pub cors: bool,
    /// Logging preferences.
    pub logging: LogSettings,
}

impl IngestConfig {
    /// Address the listener should bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            bind_addr: defaults::BIND_ADDR,
            port: defaults::PORT,
            output_path: PathBuf::from(defaults::OUTPUT_PATH),
            max_body_bytes: defaults::MAX_BODY_BYTES,
            cors: false,
            logging: LogSettings::default(),
        }
    }
}

/// Logging preferences carried through to telemetry initialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Fallback filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Explicit output format; `None` lets the build profile decide.
    pub format: Option<LogFormatSetting>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            format: None,
        }
    }
}

/// Log output format requested through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    /// Structured JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
}

impl LogFormatSetting {
    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}
