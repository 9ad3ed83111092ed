//! Linux capabilities backed by desktop helper tools.

use deskreel_capture_model::WindowSnapshot;
use deskreel_common::clock::Timestamp;
use deskreel_common::error::DeskreelResult;
use deskreel_platform_linux::{detect_display_server, query_lock_state, snapshot_windows};

use super::{native_monitor_capture, CaptureBackend, FocusProbe, LockProbe};

/// Lock state from systemd-logind's `LockedHint`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogindLockProbe;

impl LockProbe for LogindLockProbe {
    fn is_locked(&self) -> DeskreelResult<bool> {
        Ok(query_lock_state()?.is_locked())
    }
}

/// Focus and window list from wmctrl/xdotool.
#[derive(Debug, Default, Clone, Copy)]
pub struct X11FocusProbe;

impl FocusProbe for X11FocusProbe {
    fn snapshot(&self, at: Timestamp) -> DeskreelResult<WindowSnapshot> {
        snapshot_windows(at)
    }
}

pub fn backend() -> CaptureBackend {
    let display_server = detect_display_server();
    tracing::debug!(?display_server, "Building Linux capture backend");
    CaptureBackend {
        monitors: native_monitor_capture(),
        lock: std::sync::Arc::new(LogindLockProbe),
        focus: std::sync::Arc::new(X11FocusProbe),
        display_server,
    }
}
