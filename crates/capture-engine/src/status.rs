//! Operator-facing orchestrator status.

use std::path::PathBuf;

use deskreel_common::clock::Timestamp;
use serde::Serialize;

/// Whether scheduled ticks perform capture cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    #[default]
    Running,
    /// The session is locked; ticks only re-check the lock.
    Paused,
}

/// Counters and last results, published after every tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CaptureStatus {
    pub state: CaptureState,
    pub cycles_run: u64,
    pub frames_stored: u64,
    pub frames_unchanged: u64,
    pub log_records_written: u64,
    /// Cycles in a row with at least one failed step.
    pub consecutive_failures: u32,
    pub last_stored_path: Option<PathBuf>,
    pub last_error: Option<String>,
    pub last_cycle_at: Option<Timestamp>,
}

/// What happened to a cycle's frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    Stored(PathBuf),
    /// Within the threshold of the retained frame; nothing written.
    Unchanged,
    Failed(String),
}

/// What happened to a cycle's window snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum LogOutcome {
    Appended {
        /// The record carries placeholders because the focus query failed.
        error_flagged: bool,
    },
    Failed(String),
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Session locked; no work done.
    Paused,
    Completed {
        at: Timestamp,
        image: ImageOutcome,
        log: LogOutcome,
    },
}

impl CycleOutcome {
    pub fn stored_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Completed {
                image: ImageOutcome::Stored(path),
                ..
            } => Some(path),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Completed {
                image: ImageOutcome::Failed(_),
                ..
            } | Self::Completed {
                log: LogOutcome::Failed(_),
                ..
            }
        )
    }
}
