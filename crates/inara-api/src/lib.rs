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

//! HTTP surface for the article ingest service.
//!
//! Layout: `http/router.rs` (router and server host), `http/ingest.rs` (POST handler),
//! `http/errors.rs` (status mapping), `state.rs` (sink and single-writer lock).

pub mod error;
pub mod http;
pub mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::IngestServer;
pub use state::{IngestState, PersistError};
