//! Rendering and encoding of a single segment.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use reel_av::{frame_file_name, EncodeJob, SegmentEncoder};
use reel_core::{Error, Result};
use reel_media::Photo;

use crate::render::{Frame, Renderer, SourcePhoto};

/// Shared, read-only state every segment task needs.
pub(crate) struct SegmentContext {
    pub renderer: Arc<dyn Renderer>,
    pub encoder: Arc<dyn SegmentEncoder>,
    pub frames_dir: PathBuf,
    pub media_dir: PathBuf,
    pub user_delimiter: String,
}

/// What one segment task produced.
#[derive(Debug)]
pub(crate) struct BuiltSegment {
    pub segment: usize,
    /// Photos that could not be decoded and were left out of the frames.
    pub skipped: usize,
}

impl SegmentContext {
    /// Render and encode one segment.
    pub async fn process(self: Arc<Self>, segment: usize, photos: Vec<Photo>) -> Result<BuiltSegment> {
        let started = Instant::now();
        let photo_count = photos.len();

        let ctx = Arc::clone(&self);
        let (frame_count, skipped) =
            tokio::task::spawn_blocking(move || ctx.render(segment, &photos))
                .await
                .map_err(|e| Error::Internal(format!("render task join error: {e}")))??;

        let job = EncodeJob {
            segment,
            frame_count,
            frames_dir: self.frames_dir.clone(),
            media_dir: self.media_dir.clone(),
        };
        let media = self.encoder.encode_segment(&job).await?;

        let expected = self.encoder.media_unit_name(segment);
        if media != expected {
            return Err(Error::encode(
                segment,
                format!("encoder produced {media} but the manifest lists {expected}"),
            ));
        }

        tracing::info!(
            segment,
            photos = photo_count,
            skipped,
            media = %media,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "segment rebuilt"
        );
        Ok(BuiltSegment { segment, skipped })
    }

    /// Load sources, compose the tile and the singles, and write them as
    /// `img-<segment>_<frame>.png`. Returns the number of frames written and
    /// the number of photos left out because they could not be decoded.
    fn render(&self, segment: usize, photos: &[Photo]) -> Result<(usize, usize)> {
        let sources: Vec<SourcePhoto> = photos
            .par_iter()
            .filter_map(|photo| match SourcePhoto::load(photo, &self.user_delimiter) {
                Ok(source) => Some(source),
                Err(e) => {
                    tracing::warn!(
                        segment,
                        photo = %photo.file_name(),
                        error = %e,
                        "cannot decode photo, leaving it out"
                    );
                    None
                }
            })
            .collect();
        let skipped = photos.len() - sources.len();

        // The tile needs every source; singles are independent of each other.
        let (tile, singles) = rayon::join(
            || self.renderer.render_tile(&sources),
            || {
                sources
                    .par_iter()
                    .map(|s| self.renderer.render_single(s))
                    .collect::<Vec<Frame>>()
            },
        );

        let frames: Vec<Frame> = std::iter::once(tile).chain(singles).collect();

        frames
            .par_iter()
            .enumerate()
            .try_for_each(|(i, frame)| self.write_frame(segment, i, frame))?;

        remove_stale_frames(&self.frames_dir, segment, frames.len())?;

        tracing::debug!(segment, frames = frames.len(), "frames rendered");
        Ok((frames.len(), skipped))
    }

    fn write_frame(&self, segment: usize, frame_no: usize, frame: &Frame) -> Result<()> {
        let path = self.frames_dir.join(frame_file_name(segment, frame_no));
        frame
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| match e {
                image::ImageError::IoError(io) => Error::filesystem(&path, io),
                other => Error::render(segment, format!("encoding {}: {other}", path.display())),
            })
    }
}

/// Delete frames left over from a previous, larger version of the segment;
/// the encoder would otherwise pick them up.
fn remove_stale_frames(frames_dir: &Path, segment: usize, from: usize) -> Result<()> {
    let mut frame_no = from;
    loop {
        let path = frames_dir.join(frame_file_name(segment, frame_no));
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed stale frame");
                frame_no += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Error::filesystem(&path, e)),
        }
    }
}
