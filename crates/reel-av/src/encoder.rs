//! Per-segment HLS encoding.
//!
//! A segment's frames are written as `img-<segment>_<frame>.png` (frame 0 is
//! the tile, frames 1.. are the single photos). The encoder turns that
//! sequence into one HLS media unit named `video-<segment>_00000.ts`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reel_core::config::EncodeConfig;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// `img-<segment:05>_<frame:05>.png`.
pub fn frame_file_name(segment: usize, frame: usize) -> String {
    format!("img-{segment:05}_{frame:05}.png")
}

/// Everything an encoder needs to know about one segment.
#[derive(Debug, Clone)]
pub struct EncodeJob {
    pub segment: usize,
    /// Number of frames rendered for the segment, tile included.
    pub frame_count: usize,
    /// Directory holding the rendered frames.
    pub frames_dir: PathBuf,
    /// Directory receiving the media unit and its per-segment playlist.
    pub media_dir: PathBuf,
}

impl EncodeJob {
    /// printf-style input pattern over the segment's frames.
    pub fn frame_pattern(&self) -> PathBuf {
        self.frames_dir
            .join(format!("img-{:05}_%05d.png", self.segment))
    }

    /// printf-style output pattern for the segment's media files.
    pub fn media_pattern(&self) -> PathBuf {
        self.media_dir
            .join(format!("video-{:05}_%05d.ts", self.segment))
    }

    /// Per-segment playlist written by the encoder.
    pub fn playlist_path(&self) -> PathBuf {
        self.media_dir.join(format!("video-{:05}.m3u8", self.segment))
    }
}

/// Turns a segment's frame sequence into a media unit.
#[async_trait]
pub trait SegmentEncoder: Send + Sync {
    /// Encode one segment and return the media unit name, relative to the
    /// media directory.
    async fn encode_segment(&self, job: &EncodeJob) -> reel_core::Result<String>;

    /// Name the media unit of `segment` will have once encoded. Used to list
    /// segments that were not re-encoded in this run.
    fn media_unit_name(&self, segment: usize) -> String;
}

/// [`SegmentEncoder`] backed by the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg: PathBuf,
    settings: EncodeConfig,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg: impl Into<PathBuf>, settings: EncodeConfig) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            settings,
        }
    }

    /// Use the ffmpeg found by the registry.
    pub fn from_registry(tools: &ToolRegistry, settings: EncodeConfig) -> reel_core::Result<Self> {
        let ffmpeg = tools.require("ffmpeg")?;
        Ok(Self::new(ffmpeg, settings))
    }

    /// Build the ffmpeg invocation for a job.
    pub fn command(&self, job: &EncodeJob) -> ToolCommand {
        let framerate = self.settings.framerate.to_string();

        let mut cmd = ToolCommand::new(self.ffmpeg.clone());
        if let Some(secs) = self.settings.timeout_secs {
            cmd.timeout(Duration::from_secs(secs));
        }
        cmd.args(["-y", "-hide_banner", "-loglevel", "error"]);
        cmd.args(["-framerate", &framerate]);
        cmd.arg("-i");
        cmd.arg(job.frame_pattern().to_string_lossy().as_ref());
        cmd.args(["-vcodec", &self.settings.video_codec]);
        cmd.args(["-pix_fmt", &self.settings.pix_fmt]);
        cmd.args(["-r", &framerate]);
        cmd.args(["-f", "hls"]);
        cmd.args(["-hls_time", &self.settings.hls_time_secs.to_string()]);
        cmd.args(["-hls_playlist_type", "vod"]);
        cmd.args(["-hls_segment_filename", &job.media_pattern().to_string_lossy()]);
        cmd.arg(job.playlist_path().to_string_lossy().as_ref());
        cmd
    }
}

#[async_trait]
impl SegmentEncoder for FfmpegEncoder {
    async fn encode_segment(&self, job: &EncodeJob) -> reel_core::Result<String> {
        tracing::debug!(
            segment = job.segment,
            frames = job.frame_count,
            "encoding segment"
        );

        self.command(job).execute().await.map_err(|e| match e {
            reel_core::Error::Tool { message, .. } => reel_core::Error::encode(job.segment, message),
            other => other,
        })?;

        let name = self.media_unit_name(job.segment);
        if !Path::new(&job.media_dir).join(&name).is_file() {
            return Err(reel_core::Error::encode(
                job.segment,
                format!("ffmpeg finished but {name} was not produced"),
            ));
        }

        Ok(name)
    }

    fn media_unit_name(&self, segment: usize) -> String {
        format!("video-{segment:05}_00000.ts")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> EncodeJob {
        EncodeJob {
            segment: 3,
            frame_count: 10,
            frames_dir: PathBuf::from("/out/png"),
            media_dir: PathBuf::from("/out/video"),
        }
    }

    #[test]
    fn frame_names_are_zero_padded() {
        assert_eq!(frame_file_name(0, 0), "img-00000_00000.png");
        assert_eq!(frame_file_name(12, 9), "img-00012_00009.png");
    }

    #[test]
    fn job_paths() {
        let job = job();
        assert_eq!(job.frame_pattern(), PathBuf::from("/out/png/img-00003_%05d.png"));
        assert_eq!(job.media_pattern(), PathBuf::from("/out/video/video-00003_%05d.ts"));
        assert_eq!(job.playlist_path(), PathBuf::from("/out/video/video-00003.m3u8"));
    }

    #[test]
    fn ffmpeg_command_arguments() {
        let encoder = FfmpegEncoder::new("/usr/bin/ffmpeg", EncodeConfig::default());
        let cmd = encoder.command(&job());
        let line = cmd.to_string();

        assert!(line.starts_with("/usr/bin/ffmpeg -y"));
        assert!(line.contains("-framerate 10 -i /out/png/img-00003_%05d.png"));
        assert!(line.contains("-vcodec libx264 -pix_fmt yuv420p -r 10"));
        assert!(line.contains("-f hls -hls_time 1 -hls_playlist_type vod"));
        assert!(line.contains("-hls_segment_filename /out/video/video-00003_%05d.ts"));
        assert!(line.ends_with("/out/video/video-00003.m3u8"));
    }

    #[test]
    fn settings_flow_into_command() {
        let settings = EncodeConfig {
            framerate: 24,
            video_codec: "libx265".into(),
            ..EncodeConfig::default()
        };
        let cmd = FfmpegEncoder::new("ffmpeg", settings).command(&job());
        let args = cmd.get_args();
        assert!(args.windows(2).any(|w| w == ["-framerate", "24"]));
        assert!(args.windows(2).any(|w| w == ["-vcodec", "libx265"]));
    }

    #[test]
    fn timeout_only_when_configured() {
        let unbounded = FfmpegEncoder::new("ffmpeg", EncodeConfig::default()).command(&job());
        assert!(format!("{unbounded:?}").contains("timeout: None"));

        let settings = EncodeConfig {
            timeout_secs: Some(90),
            ..EncodeConfig::default()
        };
        let bounded = FfmpegEncoder::new("ffmpeg", settings).command(&job());
        assert!(format!("{bounded:?}").contains("timeout: Some(90s)"));
    }

    #[test]
    fn media_unit_name_is_first_hls_segment() {
        let encoder = FfmpegEncoder::new("ffmpeg", EncodeConfig::default());
        assert_eq!(encoder.media_unit_name(0), "video-00000_00000.ts");
        assert_eq!(encoder.media_unit_name(41), "video-00041_00000.ts");
    }

    #[tokio::test]
    async fn missing_binary_is_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = FfmpegEncoder::new("nonexistent_ffmpeg_xyz", EncodeConfig::default());
        let job = EncodeJob {
            segment: 5,
            frame_count: 1,
            frames_dir: dir.path().to_path_buf(),
            media_dir: dir.path().to_path_buf(),
        };
        let err = encoder.encode_segment(&job).await.unwrap_err();
        assert!(matches!(err, reel_core::Error::Encode { segment: 5, .. }));
    }

    #[test]
    fn from_registry_requires_ffmpeg() {
        let err = FfmpegEncoder::from_registry(&ToolRegistry::default(), EncodeConfig::default())
            .unwrap_err();
        assert!(matches!(err, reel_core::Error::Tool { .. }));
    }
}
