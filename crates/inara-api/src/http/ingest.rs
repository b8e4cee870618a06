//! POST handler: read the declared body, parse it as JSON, replace the artifact.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::CONTENT_LENGTH},
};
use serde_json::Value;
use tracing::info;

use crate::http::constants::UTF8_BOM;
use crate::http::errors::ApiError;
use crate::state::IngestState;

pub(crate) async fn ingest(
    State(state): State<Arc<IngestState>>,
    request: Request,
) -> Result<StatusCode, ApiError> {
    let (parts, body) = request.into_parts();
    let declared = declared_length(&parts.headers)?;
    if declared > state.max_body_bytes() {
        return Err(ApiError::payload_too_large(format!(
            "declared {declared} bytes, limit is {}",
            state.max_body_bytes()
        )));
    }

    let bytes = read_declared_body(body, declared).await?;
    let payload = decode_payload(&bytes)?;
    state
        .persist(&payload)
        .await
        .map_err(|err| ApiError::persistence_failure(describe_chain(&err)))?;

    info!(
        path = %parts.uri.path(),
        bytes = declared,
        artifact = %state.sink_location(),
        "payload persisted"
    );
    Ok(StatusCode::OK)
}

fn declared_length(headers: &HeaderMap) -> Result<usize, ApiError> {
    let value = headers
        .get(CONTENT_LENGTH)
        .ok_or_else(|| ApiError::malformed_request("missing content-length header"))?;
    value
        .to_str()
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .ok_or_else(|| ApiError::malformed_request("content-length is not a non-negative integer"))
}

async fn read_declared_body(body: Body, declared: usize) -> Result<Bytes, ApiError> {
    let bytes = to_bytes(body, declared).await.map_err(|err| {
        ApiError::malformed_request(format!("body could not be read in full: {err}"))
    })?;
    if bytes.len() != declared {
        return Err(ApiError::malformed_request(format!(
            "body carried {} bytes, content-length declared {declared}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

fn decode_payload(bytes: &[u8]) -> Result<Value, ApiError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|err| ApiError::malformed_request(format!("body is not valid utf-8: {err}")))?;
    let payload: Value =
        serde_json::from_str(text).map_err(|err| ApiError::invalid_payload(err.to_string()))?;
    if has_out_of_range_float(&payload) {
        return Err(ApiError::invalid_payload("number does not fit in a double"));
    }
    Ok(payload)
}

// Integer tokens of any length are kept; only fractional or exponent forms must fit an f64.
fn has_out_of_range_float(value: &Value) -> bool {
    match value {
        Value::Number(number) => {
            number.to_string().contains(['.', 'e', 'E']) && number.as_f64().is_none()
        }
        Value::Array(items) => items.iter().any(has_out_of_range_float),
        Value::Object(entries) => entries.values().any(has_out_of_range_float),
        _ => false,
    }
}

fn describe_chain(err: &dyn std::error::Error) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    description
}
