//! Shared HTTP constants (headers, error kinds).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

pub(crate) const KIND_MALFORMED_REQUEST: &str = "malformed_request";
pub(crate) const KIND_INVALID_PAYLOAD: &str = "invalid_payload";
pub(crate) const KIND_PAYLOAD_TOO_LARGE: &str = "payload_too_large";
pub(crate) const KIND_PERSISTENCE_FAILURE: &str = "persistence_failure";

/// Optional UTF-8 byte-order mark skipped before JSON decoding.
pub(crate) const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
