//! Change detection between consecutive normalized frames.
//!
//! The metric is the maximum absolute difference of any single channel of
//! any single pixel. A sharp change confined to a few pixels (a cursor, a
//! notification badge) must register, which an averaged metric would hide.

use deskreel_capture_model::NormalizedFrame;

/// Default per-channel threshold.
pub const DEFAULT_THRESHOLD: u8 = 10;

/// Decides whether a frame is worth retaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeDetector {
    threshold: u8,
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl ChangeDetector {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// `true` when there is no previous frame, the dimensions differ, or
    /// some channel differs by strictly more than the threshold.
    pub fn has_changed(&self, previous: Option<&NormalizedFrame>, current: &NormalizedFrame) -> bool {
        has_changed(previous, current, self.threshold)
    }
}

/// See [`ChangeDetector::has_changed`].
pub fn has_changed(
    previous: Option<&NormalizedFrame>,
    current: &NormalizedFrame,
    threshold: u8,
) -> bool {
    let Some(previous) = previous else {
        return true;
    };
    if previous.dimensions() != current.dimensions() {
        return true;
    }
    previous
        .as_raw()
        .iter()
        .zip(current.as_raw())
        .any(|(a, b)| a.abs_diff(*b) > threshold)
}

/// Largest single-channel difference between two frames of equal size, or
/// `None` when the sizes differ.
pub fn max_channel_difference(a: &NormalizedFrame, b: &NormalizedFrame) -> Option<u8> {
    if a.dimensions() != b.dimensions() {
        return None;
    }
    Some(
        a.as_raw()
            .iter()
            .zip(b.as_raw())
            .map(|(x, y)| x.abs_diff(*y))
            .max()
            .unwrap_or(0),
    )
}

/// Percentage of channel values whose difference exceeds `threshold`, or
/// `None` when the sizes differ. Diagnostic only.
pub fn difference_ratio(a: &NormalizedFrame, b: &NormalizedFrame, threshold: u8) -> Option<f64> {
    if a.dimensions() != b.dimensions() {
        return None;
    }
    let total = a.as_raw().len();
    if total == 0 {
        return Some(0.0);
    }
    let over = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .filter(|(x, y)| x.abs_diff(**y) > threshold)
        .count();
    Some(over as f64 * 100.0 / total as f64)
}
