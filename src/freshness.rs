//! Coarse "has anything changed" signal for the input directory.
//!
//! The token is the modification time of the input directory, or of a
//! configured marker path inside it, plus a digest of the settings that
//! shape the output. Adding or removing a photo touches the directory, so an
//! equal token lets a run finish without looking at the photos at all. The
//! fingerprint chain stays authoritative; this is only a fast path.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use reel_core::config::{AlbumConfig, EncodeConfig, MetadataConfig, RenderConfig};
use reel_core::{Config, Error, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// `<secs>.<nanos>` since the Unix epoch, then `+` and the settings digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessToken(String);

/// Everything in the config that changes segmentation, frames or media.
#[derive(Serialize)]
struct OutputSettings<'a> {
    album: &'a AlbumConfig,
    metadata: &'a MetadataConfig,
    render: &'a RenderConfig,
    encode: EncodeConfig,
}

impl FreshnessToken {
    /// Path whose modification time is watched.
    pub fn watched_path(input: &Path, marker: Option<&Path>) -> PathBuf {
        match marker {
            Some(marker) => input.join(marker),
            None => input.to_path_buf(),
        }
    }

    /// Read the current token for `input` built with `config`.
    pub fn current(input: &Path, config: &Config) -> Result<Self> {
        let path = Self::watched_path(input, config.album.freshness_marker.as_deref());
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| Error::filesystem(&path, e))?;

        let since_epoch = modified
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Internal(format!("{} predates the epoch: {e}", path.display())))?;

        Ok(Self(format!(
            "{}.{:09}+{}",
            since_epoch.as_secs(),
            since_epoch.subsec_nanos(),
            settings_digest(config)?
        )))
    }

    /// Read the token persisted by the last successful run, if any.
    pub fn load(path: &Path) -> Option<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let token = text.trim();
                (!token.is_empty()).then(|| Self(token.to_string()))
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "cannot read freshness token");
                }
                None
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FreshnessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First 16 hex characters of the SHA-256 of the output settings.
fn settings_digest(config: &Config) -> Result<String> {
    let settings = OutputSettings {
        album: &config.album,
        metadata: &config.metadata,
        render: &config.render,
        // The limit does not change what gets written.
        encode: EncodeConfig {
            timeout_secs: None,
            ..config.encode.clone()
        },
    };
    let bytes = serde_json::to_vec(&settings)
        .map_err(|e| Error::Internal(format!("cannot serialize settings: {e}")))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hasher.finalize();
    Ok(hex::encode(&digest[..8]))
}
