//! Capabilities for platforms without lock or focus adapters.
//!
//! The lock probe always fails, which keeps the orchestrator running, and
//! every focus query yields an error-flagged record.

use deskreel_capture_model::WindowSnapshot;
use deskreel_common::clock::Timestamp;
use deskreel_common::error::{DeskreelError, DeskreelResult};

use super::{native_monitor_capture, CaptureBackend, FocusProbe, LockProbe};

#[derive(Debug, Default, Clone, Copy)]
pub struct NoLockProbe;

impl LockProbe for NoLockProbe {
    fn is_locked(&self) -> DeskreelResult<bool> {
        Err(DeskreelError::unsupported("lock state query on this platform"))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoFocusProbe;

impl FocusProbe for NoFocusProbe {
    fn snapshot(&self, _at: Timestamp) -> DeskreelResult<WindowSnapshot> {
        Err(DeskreelError::unsupported("window enumeration on this platform"))
    }
}

pub fn backend() -> CaptureBackend {
    CaptureBackend {
        monitors: native_monitor_capture(),
        lock: std::sync::Arc::new(NoLockProbe),
        focus: std::sync::Arc::new(NoFocusProbe),
        display_server: Default::default(),
    }
}
