//! deskreel Capture Model
//!
//! Defines the data contracts shared by the capture pipeline and the
//! tools that consume its output:
//! - **Frames:** raw per-monitor bitmaps and the stitched normalized frame
//! - **Snapshots:** one focus/window record per capture cycle
//! - **Layout:** the bit-exact `YYYY/MM/DD` on-disk contract
//!
//! The layout is the entire surface exposed to downstream tools (video
//! generation, review UIs); there is no RPC.

pub mod frame;
pub mod layout;
pub mod snapshot;

pub use frame::*;
pub use layout::*;
pub use snapshot::*;
