//! End-to-end checks over a real listener and raw HTTP/1.1 framing.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use inara_api::IngestServer;
use inara_config::IngestConfig;
use inara_sink::{FileSink, parse_artifact};
use serde_json::json;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

struct RunningServer {
    addr: SocketAddr,
    output: PathBuf,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<inara_api::ApiServerResult<()>>,
    _dir: TempDir,
}

impl RunningServer {
    async fn start() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("inara-api-").tempdir()?;
        let output = dir.path().join("articles.js");
        let config = IngestConfig {
            max_body_bytes: 4096,
            output_path: output.clone(),
            ..IngestConfig::default()
        };
        let server = IngestServer::new(&config, Arc::new(FileSink::new(&config.output_path)));
        let listener = IngestServer::bind("127.0.0.1:0".parse()?).await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(listener, async {
            let _ = rx.await;
        }));
        Ok(Self {
            addr,
            output,
            shutdown: Some(tx),
            handle,
            _dir: dir,
        })
    }

    async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(IO_TIMEOUT, self.handle)
            .await
            .context("server did not stop in time")???;
        Ok(())
    }

    fn artifact(&self) -> Option<String> {
        read_optional(&self.output)
    }
}

fn read_optional(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

fn post_request(path: &str, body: &str) -> String {
    format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

async fn exchange(addr: SocketAddr, raw: &[u8]) -> Result<String> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(raw).await?;
    let mut response = Vec::new();
    tokio::time::timeout(IO_TIMEOUT, stream.read_to_end(&mut response))
        .await
        .context("response timed out")??;
    Ok(String::from_utf8_lossy(&response).into_owned())
}

fn status_of(response: &str) -> Result<u16> {
    let line = response
        .lines()
        .next()
        .ok_or_else(|| anyhow!("empty response"))?;
    let code = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow!("status line without code: {line}"))?;
    Ok(code.parse()?)
}

#[tokio::test]
async fn post_writes_exact_module_text() -> Result<()> {
    let server = RunningServer::start().await?;

    let response = exchange(server.addr, post_request("/", r#"{"title":"A"}"#).as_bytes()).await?;

    assert_eq!(status_of(&response)?, 200);
    assert_eq!(
        server.artifact().as_deref(),
        Some("export const articles = {\n  \"title\": \"A\"\n};")
    );
    server.stop().await
}

#[tokio::test]
async fn later_post_replaces_earlier_one() -> Result<()> {
    let server = RunningServer::start().await?;
    let first = json!([{"id": 1, "title": "Layering"}, {"id": 2, "title": "SPF"}]);
    let second = json!([]);

    exchange(server.addr, post_request("/", &first.to_string()).as_bytes()).await?;
    let response = exchange(server.addr, post_request("/", &second.to_string()).as_bytes()).await?;

    assert_eq!(status_of(&response)?, 200);
    let artifact = server.artifact().context("artifact missing")?;
    assert_eq!(artifact, "export const articles = [];");
    assert_eq!(parse_artifact(&artifact)?, second);
    server.stop().await
}

#[tokio::test]
async fn rejected_requests_leave_artifact_untouched() -> Result<()> {
    let server = RunningServer::start().await?;
    exchange(server.addr, post_request("/", r#"{"keep":true}"#).as_bytes()).await?;
    let before = server.artifact().context("artifact missing")?;

    let invalid = exchange(server.addr, post_request("/", "not json").as_bytes()).await?;
    assert_eq!(status_of(&invalid)?, 400);

    let headerless = exchange(
        server.addr,
        b"POST / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await?;
    assert_eq!(status_of(&headerless)?, 400);

    let oversized = exchange(
        server.addr,
        b"POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5000\r\nConnection: close\r\n\r\n",
    )
    .await?;
    assert_eq!(status_of(&oversized)?, 413);

    let get = exchange(
        server.addr,
        b"GET /src/data/articles.js HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await?;
    assert_eq!(status_of(&get)?, 405);

    assert_eq!(server.artifact(), Some(before));
    server.stop().await
}

#[tokio::test]
async fn truncated_body_is_not_persisted_and_listener_survives() -> Result<()> {
    let server = RunningServer::start().await?;

    let mut stream = TcpStream::connect(server.addr).await?;
    stream
        .write_all(b"POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: 64\r\n\r\n{\"partial\":")
        .await?;
    stream.shutdown().await?;
    let mut response = Vec::new();
    // The server may answer 400 or drop the connection; either way nothing is written.
    let _ = tokio::time::timeout(IO_TIMEOUT, stream.read_to_end(&mut response)).await;
    if !response.is_empty() {
        assert_eq!(status_of(&String::from_utf8_lossy(&response))?, 400);
    }
    assert!(server.artifact().is_none());

    let response = exchange(server.addr, post_request("/", "[1]").as_bytes()).await?;
    assert_eq!(status_of(&response)?, 200);
    assert_eq!(
        server.artifact().as_deref(),
        Some("export const articles = [\n  1\n];")
    );
    server.stop().await
}

#[tokio::test]
async fn missing_output_directory_yields_server_error() -> Result<()> {
    let dir = tempfile::Builder::new().prefix("inara-api-").tempdir()?;
    let output = dir.path().join("absent").join("articles.js");
    let server = IngestServer::new(&IngestConfig::default(), Arc::new(FileSink::new(&output)));
    let listener = IngestServer::bind("127.0.0.1:0".parse()?).await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve(listener, async {
        let _ = rx.await;
    }));

    let response = exchange(addr, post_request("/", "{}").as_bytes()).await?;
    assert_eq!(status_of(&response)?, 500);
    assert!(!output.exists());

    let again = exchange(addr, post_request("/", "{}").as_bytes()).await?;
    assert_eq!(status_of(&again)?, 500);

    let _ = tx.send(());
    tokio::time::timeout(IO_TIMEOUT, handle).await???;
    Ok(())
}

#[tokio::test]
async fn failed_write_keeps_previous_artifact_on_disk() -> Result<()> {
    let dir = tempfile::Builder::new().prefix("inara-api-").tempdir()?;
    let live = dir.path().join("articles.js");
    let prior = "export const articles = [\n  \"kept\"\n];";
    fs::write(&live, prior)?;
    let unreachable = dir.path().join("gone").join("..").join("articles.js");
    let server = IngestServer::new(
        &IngestConfig::default(),
        Arc::new(FileSink::new(&unreachable)),
    );
    let listener = IngestServer::bind("127.0.0.1:0".parse()?).await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve(listener, async {
        let _ = rx.await;
    }));

    let response = exchange(addr, post_request("/", r#"["replacement"]"#).as_bytes()).await?;
    assert_eq!(status_of(&response)?, 500);
    assert_eq!(read_optional(&live).as_deref(), Some(prior));

    let _ = tx.send(());
    tokio::time::timeout(IO_TIMEOUT, handle).await???;
    Ok(())
}
