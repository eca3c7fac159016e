//! Pure-Rust frame composition with the `image` crate.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use reel_core::config::RenderConfig;

use super::{Frame, Renderer, SourcePhoto};

/// [`Renderer`] that scales and places photos on a black canvas.
///
/// Overlay text is not rasterized; photos with metadata are still shrunk by
/// the picture ratio so the overlay band stays free.
#[derive(Debug, Clone)]
pub struct ImageRenderer {
    width: u32,
    height: u32,
    picture_ratio: f64,
    tile_columns: u32,
}

impl ImageRenderer {
    pub fn new(settings: &RenderConfig) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            picture_ratio: settings.picture_ratio,
            tile_columns: settings.tile_columns.max(1) as u32,
        }
    }

    fn canvas(&self) -> RgbImage {
        RgbImage::from_pixel(self.width, self.height, Rgb([0, 0, 0]))
    }

    /// Scale `src` by `scale` and paste it at `(x, y)`; parts outside the
    /// canvas are clipped.
    fn place(canvas: &mut RgbImage, src: &RgbImage, scale: f64, x: i64, y: i64) {
        let w = ((f64::from(src.width()) * scale).round() as u32).max(1);
        let h = ((f64::from(src.height()) * scale).round() as u32).max(1);
        let scaled = imageops::resize(src, w, h, FilterType::Triangle);
        imageops::overlay(canvas, &scaled, x, y);
    }
}

impl Renderer for ImageRenderer {
    fn render_tile(&self, photos: &[SourcePhoto]) -> Frame {
        let mut canvas = self.canvas();

        let columns = self.tile_columns;
        let cell_w = self.width / columns;
        let cell_h = self.height / columns;
        let slots = (columns * columns) as usize;

        if photos.len() > slots {
            tracing::warn!(
                photos = photos.len(),
                slots,
                "more photos than tile slots; extra photos not drawn"
            );
        }

        for (i, source) in photos.iter().take(slots).enumerate() {
            let i = i as u32;
            let src = &source.image;
            let scale = f64::from(self.height) / f64::from(src.height()) / f64::from(columns);
            let inset = (f64::from(cell_w) - f64::from(src.width()) * scale) / 2.0;
            let x = i64::from(cell_w * (i % columns)) + inset as i64;
            let y = i64::from(cell_h * (i / columns));
            Self::place(&mut canvas, src, scale, x, y);
        }

        canvas
    }

    fn render_single(&self, photo: &SourcePhoto) -> Frame {
        let src = &photo.image;

        if photo.metadata.is_none() && src.dimensions() == (self.width, self.height) {
            return src.clone();
        }

        let mut scale = f64::from(self.height) / f64::from(src.height());
        let mut x = (f64::from(self.width) - f64::from(src.width()) * scale) / 2.0;

        if let Some(meta) = &photo.metadata {
            scale *= self.picture_ratio;
            x *= self.picture_ratio;
            tracing::trace!(
                photo = %photo.photo.file_name(),
                date = meta.readable_date().as_deref().unwrap_or("-"),
                world = meta.world().unwrap_or("-"),
                users = meta.users().len(),
                "overlay band reserved"
            );
        }

        let mut canvas = self.canvas();
        Self::place(&mut canvas, src, scale, x as i64, 0);
        canvas
    }
}
