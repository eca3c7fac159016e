//! Frame rendering.
//!
//! Every segment becomes one tile frame (all of its photos on a grid)
//! followed by one letterboxed frame per photo. The [`Renderer`] trait is the
//! seam between the orchestrator and the pixel work, so tests can swap in a
//! cheaper implementation.

mod compose;

use std::path::Path;

use image::RgbImage;
use reel_media::png::read_metadata;
use reel_media::{Photo, PhotoMetadata};

pub use compose::ImageRenderer;

/// An output frame at the configured resolution.
pub type Frame = RgbImage;

/// A photo with its decoded pixels and overlay metadata.
#[derive(Debug, Clone)]
pub struct SourcePhoto {
    pub photo: Photo,
    pub image: RgbImage,
    pub metadata: Option<PhotoMetadata>,
}

impl SourcePhoto {
    /// Decode a photo and read its metadata chunks.
    ///
    /// Unreadable metadata only means "no overlay"; an undecodable image is
    /// an error.
    pub fn load(photo: &Photo, user_delimiter: &str) -> Result<Self, image::ImageError> {
        let data = std::fs::read(photo.path()).map_err(image::ImageError::IoError)?;
        let image = image::load_from_memory(&data)?.to_rgb8();
        let metadata = load_metadata(photo.path(), data, user_delimiter);

        Ok(Self {
            photo: photo.clone(),
            image,
            metadata,
        })
    }
}

fn load_metadata(path: &Path, data: Vec<u8>, user_delimiter: &str) -> Option<PhotoMetadata> {
    match read_metadata(data, user_delimiter) {
        Ok(record) => PhotoMetadata::from_record(record),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no overlay metadata");
            None
        }
    }
}

/// Composes output frames from source photos.
pub trait Renderer: Send + Sync {
    /// Grid of all photos of a segment.
    fn render_tile(&self, photos: &[SourcePhoto]) -> Frame;

    /// One photo, letterboxed. Photos with metadata are shrunk to leave room
    /// for the overlay band.
    fn render_single(&self, photo: &SourcePhoto) -> Frame;
}
