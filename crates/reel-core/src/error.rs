//! Fatal error type for a photoreel run.
//!
//! Anything that reaches [`Error`] aborts the run before the manifest or the
//! resume cache are rewritten. Recoverable conditions (unreadable photo
//! metadata, a corrupt manifest) live in `reel-media` and never get here.

use std::path::{Path, PathBuf};

/// Unified error type covering every failure that aborts a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A filesystem operation on a known path failed.
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O operation without a meaningful path failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool (ffmpeg) could not be run or returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// The encoder failed to produce a media unit for a segment.
    #[error("Encode error [segment {segment}]: {message}")]
    Encode {
        /// Index of the segment being encoded.
        segment: usize,
        /// Human-readable error description.
        message: String,
    },

    /// Composing the frames of a segment failed.
    #[error("Render error [segment {segment}]: {message}")]
    Render {
        /// Index of the segment being rendered.
        segment: usize,
        /// Human-readable error description.
        message: String,
    },

    /// Configuration or arguments failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Process exit code used by the CLI for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_) => 2,
            Error::Filesystem { .. } | Error::Io { .. } => 3,
            Error::Tool { .. } | Error::Encode { .. } => 4,
            Error::Render { .. } => 5,
            Error::Internal(_) => 1,
        }
    }

    /// Convenience constructor for [`Error::Filesystem`].
    pub fn filesystem(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Encode`].
    pub fn encode(segment: usize, message: impl Into<String>) -> Self {
        Error::Encode {
            segment,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Render`].
    pub fn render(segment: usize, message: impl Into<String>) -> Self {
        Error::Render {
            segment,
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
