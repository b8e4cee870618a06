#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Configuration for the article ingest service.
//!
//! Layout: `model.rs` (typed settings), `defaults.rs` (compiled defaults),
//! `validate.rs` (value parsing), `loader.rs` (environment overrides).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ENV_BIND_ADDR, ENV_ENABLE_CORS, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_MAX_BODY_BYTES,
    ENV_OUTPUT_PATH, ENV_PORT, ENV_PORT_FALLBACK,
};
pub use model::{IngestConfig, LogFormatSetting, LogSettings};
