//! # Design
//!
//! - Keep error messages constant while carrying paths for debugging.
//! - Preserve source errors without re-logging at call sites.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for artifact operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Errors raised while rendering or replacing the output artifact.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Serialising the payload failed.
    #[error("failed to render artifact")]
    Render {
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// Rendered output was not valid UTF-8.
    #[error("rendered artifact was not valid utf-8")]
    RenderUtf8 {
        /// Underlying UTF-8 conversion error.
        source: std::string::FromUtf8Error,
    },
    /// Creating the staging file next to the target failed.
    #[error("failed to stage artifact")]
    Stage {
        /// Directory the staging file was created in.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Writing or flushing the staged contents failed.
    #[error("failed to write staged artifact")]
    Write {
        /// Target artifact path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Moving the staged file over the target failed.
    #[error("failed to replace artifact")]
    Replace {
        /// Target artifact path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Artifact text did not follow the module template.
    #[error("artifact does not match the module template")]
    UnrecognisedArtifact {
        /// Machine-readable reason for the mismatch.
        reason: &'static str,
    },
    /// Artifact body was not valid JSON.
    #[error("artifact body is not valid json")]
    ParseArtifact {
        /// Underlying serde error.
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn sink_error_display_and_source() {
        let Err(json_error) = serde_json::from_str::<serde_json::Value>("invalid") else {
            panic!("expected invalid json");
        };
        let parse = SinkError::ParseArtifact { source: json_error };
        assert_eq!(parse.to_string(), "artifact body is not valid json");
        assert!(parse.source().is_some());

        let replace = SinkError::Replace {
            path: PathBuf::from("src/data/articles.js"),
            source: io::Error::other("io"),
        };
        assert_eq!(replace.to_string(), "failed to replace artifact");
        assert!(replace.source().is_some());

        let template = SinkError::UnrecognisedArtifact { reason: "prefix" };
        assert_eq!(
            template.to_string(),
            "artifact does not match the module template"
        );
        assert!(template.source().is_none());
    }
}
