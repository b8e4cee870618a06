//! Router construction and server host for the ingest API.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, header::CONTENT_TYPE},
    middleware::{self, Next},
    response::Response,
    routing::post,
};
use inara_config::IngestConfig;
use inara_sink::ArtifactSink;
use inara_telemetry::{build_sha, with_request_context};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Span, info};

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::constants::HEADER_REQUEST_ID;
use crate::http::ingest::ingest;
use crate::state::IngestState;

/// Axum router wrapper that hosts the ingest endpoint.
pub struct IngestServer {
    router: Router,
}

impl IngestServer {
    /// Construct the server around `sink` using the limits and toggles from `config`.
    #[must_use]
    pub fn new(config: &IngestConfig, sink: Arc<dyn ArtifactSink>) -> Self {
        let state = Arc::new(IngestState::new(sink, config.max_body_bytes));
        Self::with_state(state, config.cors)
    }

    /// Construct the server from prepared state.
    #[must_use]
    pub fn with_state(state: Arc<IngestState>, cors: bool) -> Self {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                tracing::info_span!(
                    "http.request",
                    method = %request.method(),
                    route = %request.uri().path(),
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(|response: &Response, latency: Duration, span: &Span| {
                span.record("status_code", response.status().as_u16());
                let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                span.record("latency_ms", latency_ms);
            });
        let layered = ServiceBuilder::new()
            .layer(inara_telemetry::propagate_request_id_layer())
            .layer(inara_telemetry::set_request_id_layer())
            .layer(trace_layer)
            .layer(middleware::from_fn(attach_request_context));

        let router = Router::new()
            .route("/", post(ingest))
            .route("/{*path}", post(ingest))
            .layer(layered);
        let router = if cors {
            router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([Method::POST, Method::OPTIONS])
                    .allow_headers([CONTENT_TYPE]),
            )
        } else {
            router
        };

        Self {
            router: router.with_state(state),
        }
    }

    /// Bind a listener on `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(addr: SocketAddr) -> ApiServerResult<TcpListener> {
        TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })
    }

    /// Serve requests from `listener` until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the server terminates unexpectedly.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> ApiServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match listener.local_addr() {
            Ok(addr) => info!(addr = %addr, "ingest listener ready"),
            Err(err) => info!(error = %err, "ingest listener ready; local address unavailable"),
        }
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }

    /// Consume the server and return the underlying router.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }
}

async fn attach_request_context(request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    with_request_context(request_id, next.run(request)).await
}
