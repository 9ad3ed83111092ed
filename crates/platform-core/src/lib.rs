//! deskreel platform core contracts.
//!
//! This crate contains cross-platform display and session data structures
//! used by the capture engine and the CLI without coupling to a concrete
//! OS backend.

use serde::{Deserialize, Serialize};

/// Information about a connected monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorInfo {
    /// Monitor name/identifier.
    pub name: String,
    /// Resolution in physical pixels.
    pub width: u32,
    pub height: u32,
    /// Position in the virtual desktop (pixels).
    pub x: i32,
    pub y: i32,
    /// Whether this monitor is primary.
    pub primary: bool,
}

/// Display server / platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayServer {
    Wayland,
    X11,
    Windows,
    MacOS,
    #[default]
    Unknown,
}

/// Whether the interactive session is currently locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Locked,
    Unlocked,
}

impl LockState {
    pub fn is_locked(self) -> bool {
        matches!(self, Self::Locked)
    }
}

/// Order monitors left to right, then top to bottom, the order in which
/// their frames are stitched.
pub fn stitch_order(monitors: &mut [MonitorInfo]) {
    monitors.sort_by(|a, b| (a.x, a.y).cmp(&(b.x, b.y)));
}

/// Compute virtual desktop bounds that include all connected monitors.
/// Returns `None` when no monitors are given.
pub fn virtual_desktop_bounds(monitors: &[MonitorInfo]) -> Option<(i32, i32, u32, u32)> {
    let min_x = monitors.iter().map(|m| m.x).min()?;
    let min_y = monitors.iter().map(|m| m.y).min()?;
    let max_x = monitors.iter().map(|m| m.x + m.width as i32).max()?;
    let max_y = monitors.iter().map(|m| m.y + m.height as i32).max()?;

    let width = (max_x - min_x).max(1) as u32;
    let height = (max_y - min_y).max(1) as u32;
    Some((min_x, min_y, width, height))
}
