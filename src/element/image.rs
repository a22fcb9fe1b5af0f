use std::sync::Arc;

use egui::{Pos2, Rect, Vec2};
use image::RgbaImage;

use super::common;

/// Shared, immutable pixel buffer of a raster element
pub type PixelBufferRef = Arc<RgbaImage>;

/// Raster element: a pixel buffer displayed at `origin` with size `size`
#[derive(Clone)]
pub struct RasterImage {
    pub origin: Pos2,
    pub size: Vec2,
    pixels: PixelBufferRef,
}

// Custom Debug implementation, the pixel data is far too long to print
impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("origin", &self.origin)
            .field("size", &self.size)
            .field("pixels", &(self.pixels.width(), self.pixels.height()))
            .finish()
    }
}

impl PartialEq for RasterImage {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
            && self.size == other.size
            && (Arc::ptr_eq(&self.pixels, &other.pixels) || *self.pixels == *other.pixels)
    }
}

impl RasterImage {
    /// Create a raster element shown at its natural pixel size
    pub fn new(origin: Pos2, pixels: RgbaImage) -> Self {
        let size = Vec2::new(pixels.width() as f32, pixels.height() as f32);
        Self {
            origin,
            size,
            pixels: Arc::new(pixels),
        }
    }

    /// Create a raster element with an explicit display size
    pub fn with_size(origin: Pos2, size: Vec2, pixels: PixelBufferRef) -> Self {
        Self {
            origin,
            size,
            pixels,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixel_handle(&self) -> &PixelBufferRef {
        &self.pixels
    }

    pub fn rect(&self) -> Rect {
        common::floored_rect(self.origin, self.size)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.origin += delta;
    }
}
