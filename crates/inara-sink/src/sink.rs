//! Destinations for the rendered artifact.
//!
//! # Design
//! - `ArtifactSink` is the only seam between request handling and storage.
//! - `FileSink` stages the new contents in a sibling temporary file and renames it over the
//!   target, so a failed write leaves the previous artifact intact.
//! - The parent directory is expected to exist; it is never created here.
//! - `MemorySink` keeps the latest contents in memory for tests and dry runs.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::error::{SinkError, SinkResult};

/// Storage for the single output artifact.
///
/// Implementations perform blocking IO; async callers should run them on a blocking pool and
/// serialise calls so replacements never interleave.
pub trait ArtifactSink: Send + Sync + 'static {
    /// Replace the artifact with `contents` in full.
    ///
    /// # Errors
    ///
    /// Returns an error if the new contents could not be stored. The previous artifact must
    /// remain readable when this fails.
    fn replace(&self, contents: &str) -> SinkResult<()>;

    /// Human-readable description of where the artifact lives.
    fn location(&self) -> String;
}

/// Sink that writes the artifact to a path on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink targeting `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl ArtifactSink for FileSink {
    fn replace(&self, contents: &str) -> SinkResult<()> {
        let staging_dir = self.staging_dir();
        let mut staged = tempfile::Builder::new()
            .prefix(".inara-")
            .suffix(".tmp")
            .tempfile_in(staging_dir)
            .map_err(|source| SinkError::Stage {
                path: staging_dir.to_path_buf(),
                source,
            })?;

        let write_error = |source| SinkError::Write {
            path: self.path.clone(),
            source,
        };
        staged
            .write_all(contents.as_bytes())
            .map_err(write_error)?;
        staged.as_file().sync_all().map_err(write_error)?;
        carry_permissions(&self.path, staged.as_file()).map_err(write_error)?;

        staged
            .persist(&self.path)
            .map_err(|err| SinkError::Replace {
                path: self.path.clone(),
                source: err.error,
            })?;
        debug!(
            path = %self.path.display(),
            bytes = contents.len(),
            "artifact replaced"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// Temporary files are created 0600; keep the target's mode, or 0644 for a new artifact.
#[cfg(unix)]
fn carry_permissions(target: &Path, staged: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = match fs::metadata(target) {
        Ok(metadata) => metadata.permissions().mode() & 0o7777,
        Err(err) if err.kind() == io::ErrorKind::NotFound => 0o644,
        Err(err) => return Err(err),
    };
    staged.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn carry_permissions(target: &Path, staged: &File) -> io::Result<()> {
    match fs::metadata(target) {
        Ok(metadata) => staged.set_permissions(metadata.permissions()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Sink that keeps the latest artifact in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    contents: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that already holds `contents`.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
            writes: AtomicUsize::new(0),
        }
    }

    /// Latest stored artifact, if any.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Number of successful replacements.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ArtifactSink for MemorySink {
    fn replace(&self, contents: &str) -> SinkResult<()> {
        let mut slot = self
            .contents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some(contents.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
