//! HTTP surface modules (router, handler, error mapping).

/// Shared constants and header names.
pub mod constants;
/// Status mapping for ingest failures.
pub mod errors;
/// POST handler that persists the payload.
pub mod ingest;
/// Router construction and server host.
pub mod router;
