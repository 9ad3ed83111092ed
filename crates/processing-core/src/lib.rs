//! deskreel Processing Core
//!
//! Per-cycle image work between acquisition and storage:
//! - **Normalization:** stitch per-monitor frames into one uniformly scaled RGB image
//! - **Change Detection:** decide whether a frame differs enough from the last retained one
//!
//! This crate is pure computation. No I/O, no platform dependencies.

pub mod change;
pub mod normalize;

pub use change::ChangeDetector;
pub use normalize::ImageNormalizer;
