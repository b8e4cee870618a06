//! Compiled defaults for the ingest service.
//!
//! # Design
//! - Defaults reproduce the fixed constants the service has always shipped with.
//! - Environment overrides are optional; a bare process uses these values.

use std::net::{IpAddr, Ipv4Addr};

/// Listener address when no override is supplied (all interfaces).
pub const BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
/// Listener port when no override is supplied.
pub const PORT: u16 = 8000;
/// Generated module the payload is written to, relative to the working directory.
pub const OUTPUT_PATH: &str = "src/data/articles.js";
/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
/// Log level used when neither `RUST_LOG` nor an override is set.
pub const LOG_LEVEL: &str = "info";
