//! Ingest failure wrapper and its status mapping.
//!
//! Error responses carry only a status code; the detail is logged with the request id.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use inara_telemetry::current_request_id;
use tracing::{error, warn};

use crate::http::constants::{
    KIND_INVALID_PAYLOAD, KIND_MALFORMED_REQUEST, KIND_PAYLOAD_TOO_LARGE, KIND_PERSISTENCE_FAILURE,
};

/// Structured ingest failure.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) kind: &'static str,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, detail: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            detail: detail.into(),
        }
    }

    /// Missing or unusable framing: length header, truncated body, bad encoding.
    pub(crate) fn malformed_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, KIND_MALFORMED_REQUEST, detail)
    }

    /// Body decoded but is not well-formed JSON.
    pub(crate) fn invalid_payload(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, KIND_INVALID_PAYLOAD, detail)
    }

    /// Declared length exceeds the configured body limit.
    pub(crate) fn payload_too_large(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, KIND_PAYLOAD_TOO_LARGE, detail)
    }

    /// The artifact could not be replaced; the previous one is still in place.
    pub(crate) fn persistence_failure(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            KIND_PERSISTENCE_FAILURE,
            detail,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = current_request_id().unwrap_or_default();
        if self.status.is_server_error() {
            error!(
                status = self.status.as_u16(),
                kind = self.kind,
                detail = %self.detail,
                request_id = %request_id,
                "ingest request failed"
            );
        } else {
            warn!(
                status = self.status.as_u16(),
                kind = self.kind,
                detail = %self.detail,
                request_id = %request_id,
                "ingest request rejected"
            );
        }
        self.status.into_response()
    }
}
