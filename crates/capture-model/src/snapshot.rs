//! Window snapshot records for the per-day event log.
//!
//! One record is emitted per capture cycle, whether or not the frame was
//! retained. Records are written as JSON Lines: each line is a complete,
//! self-contained object with no enclosing array, so a reader must go
//! line by line.

use chrono::SecondsFormat;
use deskreel_common::clock::Timestamp;
use serde::{Deserialize, Serialize};

/// Placeholder used when the focused application cannot be determined.
pub const UNKNOWN_APP: &str = "Unknown";

/// Focus and visible-window state at one capture instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    /// Capture instant (RFC 3339, microsecond precision).
    #[serde(with = "timestamp_format")]
    pub timestamp: Timestamp,

    /// Foreground application.
    pub focused_app_name: String,
    pub focused_app_pid: u32,

    /// Title of the foreground application's topmost window.
    pub focused_window_name: String,

    /// Visible windows, in enumeration order.
    pub windows: Vec<WindowRecord>,

    /// Set when all or part of the focus/window query failed. The affected
    /// fields then carry placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One visible window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub app_name: String,
    pub window_name: String,
    pub owner_pid: u32,

    /// The owning application is the foreground application.
    pub is_active: bool,

    /// This specific window holds keyboard focus.
    pub is_focused_window: bool,
}

impl WindowSnapshot {
    /// An error-flagged record for a cycle whose focus query failed.
    pub fn unavailable(timestamp: Timestamp, reason: impl Into<String>) -> Self {
        Self {
            timestamp,
            focused_app_name: UNKNOWN_APP.to_string(),
            focused_app_pid: 0,
            focused_window_name: String::new(),
            windows: Vec::new(),
            error: Some(reason.into()),
        }
    }

    pub fn is_error_flagged(&self) -> bool {
        self.error.is_some()
    }

    /// Serialize as one log line, without the trailing separator.
    pub fn to_record_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A log line that could not be decoded.
#[derive(Debug)]
pub struct RecordError {
    /// 1-based line number in the log file.
    pub line: usize,
    pub error: serde_json::Error,
}

/// Decode log content record by record.
///
/// Blank lines are skipped. Each remaining line yields its own result, so
/// one torn line (e.g. from a crash mid-write) never hides its neighbours.
pub fn parse_records(
    jsonl: &str,
) -> impl Iterator<Item = Result<WindowSnapshot, RecordError>> + '_ {
    jsonl
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line.trim()).map_err(|error| RecordError {
                line: idx + 1,
                error,
            })
        })
}

/// Format a capture timestamp the way the event log stores it.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Parse an RFC 3339 timestamp as written by [`format_timestamp`].
/// Timestamps without an explicit offset are rejected.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    chrono::DateTime::parse_from_rfc3339(raw.trim()).ok()
}

mod timestamp_format {
    use super::{format_timestamp, parse_timestamp, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")))
    }
}
