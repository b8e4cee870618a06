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

//! Output artifact handling for the ingest service.
//!
//! Layout: `render.rs` (module template and JSON formatting), `sink.rs`
//! (`ArtifactSink` plus file and in-memory implementations), `error.rs`.

pub mod error;
pub mod render;
pub mod sink;

pub use error::{SinkError, SinkResult};
pub use render::{ARTIFACT_PREFIX, ARTIFACT_SUFFIX, parse_artifact, render_artifact};
pub use sink::{ArtifactSink, FileSink, MemorySink};
