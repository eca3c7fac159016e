//! Error types for reel-media.
//!
//! Both error families are recoverable: a [`FormatError`] means "no overlay
//! metadata for this photo" and a [`ManifestError`] means "no prior records,
//! rebuild everything". Neither aborts a run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to extract metadata chunks from a photo.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The stream does not start with the 8-byte PNG signature.
    #[error("not a PNG stream (bad signature)")]
    BadSignature,

    /// A chunk header, payload or CRC runs past the end of the stream.
    #[error("truncated chunk: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    /// A metadata payload is not valid UTF-8 text.
    #[error("chunk {tag} does not hold valid UTF-8 text")]
    InvalidText { tag: String },

    /// A file name cannot produce a line-safe fingerprint.
    #[error("file name {name:?} yields an unusable fingerprint")]
    InvalidFingerprint { name: String },

    /// The photo could not be read from disk.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failure to recover index records from a manifest or resume cache.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No file at the expected location.
    #[error("manifest not found: {}", .0.display())]
    Missing(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Unreadable { path: PathBuf, source: io::Error },

    /// The contents cannot be trusted as a ledger.
    #[error("corrupt manifest: {0}")]
    Corrupt(String),
}

impl ManifestError {
    /// Create a corrupt-manifest error.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}

/// Result type for chunk parsing.
pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// Result type for manifest reading.
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;
