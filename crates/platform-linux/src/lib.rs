//! deskreel Linux Platform Integration
//!
//! Platform-specific implementations for Linux desktops:
//! - **Display Detection:** display server and monitor layout (`xrandr`)
//! - **Session:** lock state from systemd-logind (`loginctl`)
//! - **Windows:** focused application and visible windows (`wmctrl`, `xdotool`)
//! - **Permissions:** helper tool availability and user guidance
//!
//! Every query shells out to a standard desktop tool. Output parsing is
//! kept in pure functions so it can be tested without a session.

pub mod display;
pub mod permissions;
pub mod session;
pub mod tool;
pub mod windows;

pub use display::*;
pub use session::*;
pub use windows::*;
