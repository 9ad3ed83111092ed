//! deskreel Capture Engine
//!
//! Runs the periodic capture loop: pause while the session is locked,
//! otherwise grab every monitor, keep the frame only if it changed, and
//! log the focused and visible windows every cycle.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │               CaptureOrchestrator                │
//! │  LockProbe ──► RUNNING / PAUSED                  │
//! │                                                  │
//! │  MonitorCapture ─► normalize ─► detect ─► store  │
//! │  FocusProbe ─────────────────────────────► log   │
//! │        │                                 │       │
//! │        ▼                                 ▼       │
//! │  ┌────────────────────────────────────────────┐  │
//! │  │  <root>/YYYY/MM/DD/                        │  │
//! │  │    YYYYMMDD_HHMMSS.png  window_data.jsonl  │  │
//! │  └────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod orchestrator;
pub mod retry;
pub mod status;

pub use backend::{get_backend, CaptureBackend, FocusProbe, LockProbe, MonitorCapture};
pub use orchestrator::{CaptureOrchestrator, OrchestratorConfig};
pub use retry::RetryPolicy;
pub use status::*;
