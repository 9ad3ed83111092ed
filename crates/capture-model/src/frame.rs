//! Frame types produced and consumed within one capture cycle.

use image::{DynamicImage, RgbImage};

/// A raw bitmap grabbed from one physical display.
///
/// The native resolution is the bitmap's own size; the channel layout is
/// whatever the grabber produced (RGBA from most backends).
#[derive(Debug, Clone)]
pub struct MonitorFrame {
    /// Display name as reported by the platform.
    pub name: String,

    /// Captured pixels.
    pub image: DynamicImage,
}

impl MonitorFrame {
    pub fn new(name: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// The stitched, uniformly scaled image representing all monitors for one
/// cycle. Always 8-bit RGB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFrame {
    pixels: RgbImage,
}

impl NormalizedFrame {
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Raw interleaved RGB bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn into_rgb(self) -> RgbImage {
        self.pixels
    }
}
