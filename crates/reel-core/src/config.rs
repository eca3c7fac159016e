//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML and carries all
//! sub-configs for the album layout, metadata parsing, rendering, encoding
//! and external tools. Every section defaults sensibly so an empty file is
//! valid, and the value is passed explicitly into the orchestrator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub album: AlbumConfig,
    pub metadata: MetadataConfig,
    pub render: RenderConfig,
    pub encode: EncodeConfig,
    pub tools: ToolsConfig,
    /// Number of segments rendered/encoded concurrently. Defaults to the
    /// number of logical CPUs when unset.
    pub workers: Option<usize>,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Reject values that make a run impossible.
    pub fn validate(&self) -> Result<()> {
        if self.album.tile_capacity == 0 {
            return Err(Error::Validation("album.tile_capacity must be > 0".into()));
        }
        if self.album.block_size == Some(0) {
            return Err(Error::Validation(
                "album.block_size must be > 0 (omit it to disable blocks)".into(),
            ));
        }
        if self.album.file_prefix.is_empty() {
            return Err(Error::Validation("album.file_prefix is empty".into()));
        }
        if self.album.fingerprint.length == 0 {
            return Err(Error::Validation(
                "album.fingerprint.length must be > 0".into(),
            ));
        }
        if self.render.width == 0 || self.render.height == 0 {
            return Err(Error::Validation(format!(
                "render size {}x{} is empty",
                self.render.width, self.render.height
            )));
        }
        if self.render.tile_columns == 0 {
            return Err(Error::Validation("render.tile_columns must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.render.picture_ratio) || self.render.picture_ratio == 0.0 {
            return Err(Error::Validation(format!(
                "render.picture_ratio {} is outside (0, 1]",
                self.render.picture_ratio
            )));
        }
        if self.encode.framerate == 0 {
            return Err(Error::Validation("encode.framerate must be > 0".into()));
        }
        if self.encode.timeout_secs == Some(0) {
            return Err(Error::Validation(
                "encode.timeout_secs must be > 0 (omit it to disable the limit)".into(),
            ));
        }
        if self.workers == Some(0) {
            return Err(Error::Validation("workers must be > 0".into()));
        }
        Ok(())
    }

    /// Non-fatal oddities worth logging.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let tile_slots = self.render.tile_columns * self.render.tile_columns;
        if self.album.tile_capacity > tile_slots {
            warnings.push(format!(
                "album.tile_capacity {} exceeds the {} slots of a {}x{} tile; extra photos are not drawn",
                self.album.tile_capacity,
                tile_slots,
                self.render.tile_columns,
                self.render.tile_columns
            ));
        }

        if self.metadata.user_delimiter.is_empty() {
            warnings.push("metadata.user_delimiter is empty; handles are never split".into());
        }

        if let Some(ref ffmpeg) = self.tools.ffmpeg_path {
            if !ffmpeg.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; falling back to PATH",
                    ffmpeg.display()
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Album layout: segmentation, naming and block splitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumConfig {
    /// Photos per segment (one tile plus one frame per photo).
    pub tile_capacity: usize,
    /// Entries per block playlist; `None` disables block playlists.
    pub block_size: Option<usize>,
    /// Base name of the manifest and block playlists.
    pub file_prefix: String,
    /// Pre-existing media unit used to pad the last block playlist.
    pub placeholder_media: String,
    /// File extensions picked up from the input directory.
    pub extensions: Vec<String>,
    pub fingerprint: FingerprintConfig,
    /// Path inside the input directory whose modification time is the
    /// freshness token. `None` uses the input directory itself.
    pub freshness_marker: Option<PathBuf>,
}

impl Default for AlbumConfig {
    fn default() -> Self {
        Self {
            tile_capacity: 9,
            block_size: Some(180),
            file_prefix: "vrc_photo_album".into(),
            placeholder_media: "blank.ts".into(),
            extensions: vec!["png".into()],
            fingerprint: FingerprintConfig::default(),
            freshness_marker: None,
        }
    }
}

/// Character window of a file name used as the photo fingerprint.
///
/// The defaults cut `2024-01-01_12-00-00.000` out of
/// `VRChat_1920x1080_2024-01-01_12-00-00.000.png`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    pub offset: usize,
    pub length: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            offset: 17,
            length: 23,
        }
    }
}

/// Photo metadata parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Separator between a tagged user's name and handle in `vrCu` chunks.
    pub user_delimiter: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            user_delimiter: " : ".into(),
        }
    }
}

/// Frame composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Share of the frame height given to the photo when an overlay is drawn.
    pub picture_ratio: f64,
    /// Columns (and rows) of the overview tile.
    pub tile_columns: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            picture_ratio: 0.8,
            tile_columns: 3,
        }
    }
}

/// Segment encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Input and output frame rate.
    pub framerate: u32,
    /// `-hls_time` handed to ffmpeg.
    pub hls_time_secs: u32,
    pub video_codec: String,
    pub pix_fmt: String,
    /// Upper bound for a single ffmpeg invocation. Unset means ffmpeg runs
    /// to completion.
    pub timeout_secs: Option<u64>,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            framerate: 10,
            hls_time_secs: 1,
            video_codec: "libx264".into(),
            pix_fmt: "yuv420p".into(),
            timeout_secs: None,
        }
    }
}

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
}
