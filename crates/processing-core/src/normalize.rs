//! Stitching per-monitor frames into one normalized frame.
//!
//! Every frame is scaled uniformly to the tallest frame's height and the
//! results are placed left to right in the order given. The output is
//! always 8-bit RGB.

use deskreel_capture_model::{MonitorFrame, NormalizedFrame};
use deskreel_common::error::{DeskreelError, DeskreelResult};
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Scales and concatenates monitor frames.
#[derive(Debug, Clone, Copy)]
pub struct ImageNormalizer {
    filter: FilterType,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl ImageNormalizer {
    /// Normalize one cycle's frames.
    ///
    /// An empty list or a zero-sized frame is a format error.
    pub fn normalize(&self, frames: &[MonitorFrame]) -> DeskreelResult<NormalizedFrame> {
        if frames.is_empty() {
            return Err(DeskreelError::format("no monitor frames to normalize"));
        }
        if let Some(bad) = frames.iter().find(|f| f.width() == 0 || f.height() == 0) {
            return Err(DeskreelError::format(format!(
                "monitor {} reported an empty frame ({}x{})",
                bad.name,
                bad.width(),
                bad.height()
            )));
        }

        let target_height = frames.iter().map(MonitorFrame::height).max().unwrap_or(1);

        let mut scaled = Vec::with_capacity(frames.len());
        let mut total_width: u32 = 0;
        for frame in frames {
            let rgb = frame.image.to_rgb8();
            let rgb = if frame.height() == target_height {
                rgb
            } else {
                let width = scaled_width(frame.width(), frame.height(), target_height);
                imageops::resize(&rgb, width, target_height, self.filter)
            };
            total_width = total_width.checked_add(rgb.width()).ok_or_else(|| {
                DeskreelError::format("stitched frame width overflows u32")
            })?;
            scaled.push(rgb);
        }

        let mut canvas = RgbImage::new(total_width, target_height);
        let mut x: i64 = 0;
        for part in &scaled {
            imageops::replace(&mut canvas, part, x, 0);
            x += i64::from(part.width());
        }

        tracing::trace!(
            monitors = frames.len(),
            width = total_width,
            height = target_height,
            "Normalized frame"
        );
        Ok(NormalizedFrame::from_rgb(canvas))
    }
}

/// Normalize with the default filter.
pub fn normalize(frames: &[MonitorFrame]) -> DeskreelResult<NormalizedFrame> {
    ImageNormalizer::default().normalize(frames)
}

/// Width after scaling `(width, height)` to `target_height`, rounded to the
/// nearest pixel and never below one.
pub fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    let height = u64::from(height.max(1));
    let scaled = (u64::from(width) * u64::from(target_height) + height / 2) / height;
    scaled.clamp(1, u64::from(u32::MAX)) as u32
}
