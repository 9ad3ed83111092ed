//! Session lock state via systemd-logind.

use deskreel_common::error::{DeskreelError, DeskreelResult};
use deskreel_platform_core::LockState;

use crate::tool::run_tool;

/// Query whether the current login session is locked.
///
/// Uses `XDG_SESSION_ID` when set and falls back to logind's `self`
/// session otherwise.
pub fn query_lock_state() -> DeskreelResult<LockState> {
    let session = std::env::var("XDG_SESSION_ID").unwrap_or_else(|_| "self".to_string());
    let output = run_tool(
        "loginctl",
        &["show-session", &session, "-p", "LockedHint", "--value"],
    )?;
    parse_locked_hint(&output)
}

/// Interpret the value of logind's `LockedHint` property.
pub fn parse_locked_hint(value: &str) -> DeskreelResult<LockState> {
    match value.trim() {
        "yes" => Ok(LockState::Locked),
        "no" => Ok(LockState::Unlocked),
        other => Err(DeskreelError::platform(format!(
            "unexpected LockedHint value: {other:?}"
        ))),
    }
}
