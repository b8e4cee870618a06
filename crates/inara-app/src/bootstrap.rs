//! Bootstrap wiring for the ingest service.
//!
//! # Design
//! - Loads configuration before logging so the subscriber honours the configured level and format.
//! - Builds the file-backed sink once and hands it to the API layer behind the sink trait.
//! - Stops accepting connections on Ctrl-C or SIGTERM and lets in-flight writes finish.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use inara_api::IngestServer;
use inara_config::{IngestConfig, LogFormatSetting};
use inara_sink::FileSink;
use inara_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Entry point used by the binary.
///
/// # Errors
///
/// Returns an error if configuration, logging, or the listener fail to start.
pub async fn run_app() -> AppResult<()> {
    let config =
        IngestConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;

    let logging = LoggingConfig {
        level: &config.logging.level,
        format: LogFormat::from_name(config.logging.format.map(LogFormatSetting::as_str)),
        build_sha: option_env!("INARA_BUILD_SHA").unwrap_or("dev"),
    };
    inara_telemetry::init_logging(&logging)
        .map_err(|err| AppError::telemetry("telemetry.init_logging", err))?;

    serve_with(config, shutdown_signal()).await
}

/// Host the ingest endpoint with `config` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve_with<F>(config: IngestConfig, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let _context = GlobalContextGuard::new("ingest");

    info!(
        addr = %config.socket_addr(),
        output = %config.output_path.display(),
        max_body_bytes = config.max_body_bytes,
        cors = config.cors,
        "starting ingest service"
    );
    if !output_parent_exists(&config.output_path) {
        warn!(
            output = %config.output_path.display(),
            "output directory does not exist; writes will fail until it is created"
        );
    }

    let sink = Arc::new(FileSink::new(&config.output_path));
    let server = IngestServer::new(&config, sink);
    let listener = IngestServer::bind(config.socket_addr())
        .await
        .map_err(|err| AppError::api_server("api_server.bind", err))?;

    server
        .serve(listener, shutdown)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))?;

    info!("ingest service stopped");
    Ok(())
}

fn output_parent_exists(path: &Path) -> bool {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.is_dir(),
        _ => true,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c; shutting down"),
        () = terminate => info!("received SIGTERM; shutting down"),
    }
}
