//! Shared state for the ingest handler.
//!
//! # Design
//! - The sink is injected so tests can substitute an in-memory implementation.
//! - Replacements are serialised behind one async mutex; the blocking write runs on the
//!   blocking pool while the lock is held, so two requests never interleave on the artifact.
//! - The blocking write re-enters the caller's span so sink logs keep the request context.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use inara_sink::{ArtifactSink, SinkError, render_artifact};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinError;
use tracing::Span;

/// Dependencies shared by every ingest request.
pub struct IngestState {
    sink: Arc<dyn ArtifactSink>,
    write_lock: Mutex<()>,
    max_body_bytes: usize,
}

impl IngestState {
    /// Build state around an artifact sink and a request body limit.
    #[must_use]
    pub fn new(sink: Arc<dyn ArtifactSink>, max_body_bytes: usize) -> Self {
        Self {
            sink,
            write_lock: Mutex::new(()),
            max_body_bytes,
        }
    }

    /// Largest declared body length accepted.
    #[must_use]
    pub const fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Description of the artifact destination for logs.
    #[must_use]
    pub fn sink_location(&self) -> String {
        self.sink.location()
    }

    /// Render `payload` into the module template and replace the artifact with it.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails, the sink rejects the write, or the blocking
    /// worker could not complete.
    pub async fn persist(&self, payload: &Value) -> Result<(), PersistError> {
        let contents = render_artifact(payload).map_err(|source| PersistError::Sink { source })?;
        let _guard = self.write_lock.lock().await;
        let sink = Arc::clone(&self.sink);
        let span = Span::current();
        tokio::task::spawn_blocking(move || span.in_scope(|| sink.replace(&contents)))
            .await
            .map_err(|source| PersistError::Worker { source })?
            .map_err(|source| PersistError::Sink { source })
    }
}

/// Failures while persisting a parsed payload.
#[derive(Debug)]
pub enum PersistError {
    /// Rendering or storing the artifact failed.
    Sink {
        /// Underlying sink error.
        source: SinkError,
    },
    /// The blocking write task panicked or was cancelled.
    Worker {
        /// Underlying join error.
        source: JoinError,
    },
}

impl Display for PersistError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sink { .. } => formatter.write_str("failed to store artifact"),
            Self::Worker { .. } => formatter.write_str("artifact writer task failed"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sink { source } => Some(source),
            Self::Worker { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inara_sink::{MemorySink, SinkResult};
    use serde_json::json;
    use std::sync::{Mutex as StdMutex, PoisonError};
    use tracing::Instrument;

    #[derive(Default)]
    struct SpanRecordingSink {
        seen: StdMutex<Option<String>>,
    }

    impl SpanRecordingSink {
        fn seen(&self) -> Option<String> {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl ArtifactSink for SpanRecordingSink {
        fn replace(&self, _contents: &str) -> SinkResult<()> {
            let name = Span::current()
                .metadata()
                .map(|metadata| metadata.name().to_string());
            *self.seen.lock().unwrap_or_else(PoisonError::into_inner) = name;
            Ok(())
        }

        fn location(&self) -> String {
            "recording".to_string()
        }
    }

    #[tokio::test]
    async fn persist_renders_into_sink() -> Result<(), Box<dyn Error>> {
        let sink = Arc::new(MemorySink::new());
        let state = IngestState::new(sink.clone(), 1024);
        state.persist(&json!({"title": "A"})).await?;
        assert_eq!(
            sink.contents().as_deref(),
            Some("export const articles = {\n  \"title\": \"A\"\n};")
        );
        assert_eq!(state.max_body_bytes(), 1024);
        assert_eq!(state.sink_location(), "memory");
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_persists_each_write_a_complete_artifact() -> Result<(), Box<dyn Error>> {
        let sink = Arc::new(MemorySink::new());
        let state = Arc::new(IngestState::new(sink.clone(), 1024));
        let mut handles = Vec::new();
        for index in 0..16 {
            let state = Arc::clone(&state);
            handles.push(tokio::spawn(async move {
                state.persist(&json!({ "index": index })).await
            }));
        }
        for handle in handles {
            handle.await??;
        }
        assert_eq!(sink.write_count(), 16);
        let contents = sink.contents().ok_or("missing artifact")?;
        let payload = inara_sink::parse_artifact(&contents)?;
        assert!(payload.get("index").and_then(Value::as_u64).is_some());
        Ok(())
    }

    #[tokio::test]
    async fn persist_runs_sink_inside_caller_span() -> Result<(), Box<dyn Error>> {
        // Spans are only tracked once a subscriber exists; the registry is enough.
        let _ = tracing::subscriber::set_global_default(tracing_subscriber::registry());
        let sink = Arc::new(SpanRecordingSink::default());
        let state = IngestState::new(sink.clone(), 1024);

        state
            .persist(&json!([]))
            .instrument(tracing::info_span!("ingest.persist"))
            .await?;

        assert_eq!(sink.seen().as_deref(), Some("ingest.persist"));
        Ok(())
    }

    #[test]
    fn persist_error_display_and_source() {
        let err = PersistError::Sink {
            source: SinkError::UnrecognisedArtifact { reason: "prefix" },
        };
        assert_eq!(err.to_string(), "failed to store artifact");
        assert!(err.source().is_some());
    }
}
