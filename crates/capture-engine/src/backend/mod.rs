//! Platform capabilities the orchestrator depends on.
//!
//! Each capability is a small blocking trait. The orchestrator only ever
//! calls them from `spawn_blocking`, so implementations may shell out or
//! block on native APIs freely.

use std::sync::Arc;

use deskreel_capture_model::{MonitorFrame, WindowSnapshot};
use deskreel_common::clock::Timestamp;
use deskreel_common::error::{DeskreelError, DeskreelResult};
use deskreel_platform_core::DisplayServer;

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(not(target_os = "linux"))]
pub mod fallback;
#[cfg(feature = "native-capture")]
pub mod native;

/// Grabs every connected monitor.
pub trait MonitorCapture: Send + Sync {
    /// One frame per monitor, ordered left to right across the desktop.
    fn capture_monitors(&self) -> DeskreelResult<Vec<MonitorFrame>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Reports whether the interactive session is locked.
pub trait LockProbe: Send + Sync {
    fn is_locked(&self) -> DeskreelResult<bool>;
}

/// Produces the focus and visible-window snapshot for a cycle.
pub trait FocusProbe: Send + Sync {
    fn snapshot(&self, at: Timestamp) -> DeskreelResult<WindowSnapshot>;
}

/// The capabilities one orchestrator runs against.
#[derive(Clone)]
pub struct CaptureBackend {
    pub monitors: Arc<dyn MonitorCapture>,
    pub lock: Arc<dyn LockProbe>,
    pub focus: Arc<dyn FocusProbe>,
    pub display_server: DisplayServer,
}

impl CaptureBackend {
    pub fn new(
        monitors: impl MonitorCapture + 'static,
        lock: impl LockProbe + 'static,
        focus: impl FocusProbe + 'static,
    ) -> Self {
        Self {
            monitors: Arc::new(monitors),
            lock: Arc::new(lock),
            focus: Arc::new(focus),
            display_server: DisplayServer::Unknown,
        }
    }

    pub fn with_display_server(mut self, display_server: DisplayServer) -> Self {
        self.display_server = display_server;
        self
    }
}

impl std::fmt::Debug for CaptureBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureBackend")
            .field("monitors", &self.monitors.name())
            .field("display_server", &self.display_server)
            .finish_non_exhaustive()
    }
}

/// Monitor capture for builds without a native grabber.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedCapture;

impl MonitorCapture for UnsupportedCapture {
    fn capture_monitors(&self) -> DeskreelResult<Vec<MonitorFrame>> {
        Err(DeskreelError::unsupported(
            "monitor capture requires the native-capture feature",
        ))
    }

    fn name(&self) -> &str {
        "unsupported"
    }
}

/// The native monitor grabber compiled into this build.
pub fn native_monitor_capture() -> Arc<dyn MonitorCapture> {
    #[cfg(feature = "native-capture")]
    {
        Arc::new(native::XcapCapture)
    }
    #[cfg(not(feature = "native-capture"))]
    {
        Arc::new(UnsupportedCapture)
    }
}

/// Get the platform-specific backend.
pub fn get_backend() -> CaptureBackend {
    #[cfg(target_os = "linux")]
    {
        linux::backend()
    }
    #[cfg(not(target_os = "linux"))]
    {
        fallback::backend()
    }
}
