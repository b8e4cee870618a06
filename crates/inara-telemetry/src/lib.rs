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

//! Logging and tracing helpers shared by the ingest service crates.
//!
//! Layout: `init.rs` (subscriber installation), `context.rs` (span and request
//! context helpers), `layers.rs` (request-id middleware), `error.rs`.

pub mod context;
pub mod error;
pub mod init;
pub mod layers;

pub use context::{GlobalContextGuard, current_request_id, with_request_context};
pub use error::{Result, TelemetryError};
pub use init::{LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{propagate_request_id_layer, set_request_id_layer};
