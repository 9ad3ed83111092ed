//! Focus and visible-window enumeration on X11.
//!
//! Windows come from `wmctrl -lp`, the focused window from
//! `xdotool getactivewindow`, and application names from
//! `/proc/<pid>/comm`. Either query may fail on its own; the snapshot then
//! carries placeholders for the missing half and names the failure in its
//! `error` field.

use deskreel_common::clock::Timestamp;
use deskreel_common::error::{DeskreelError, DeskreelResult};
use deskreel_capture_model::{WindowRecord, WindowSnapshot, UNKNOWN_APP};

use crate::tool::run_tool;

/// One line of `wmctrl -lp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedWindow {
    pub id: u64,
    /// Desktop index, `-1` for sticky windows.
    pub desktop: i64,
    pub pid: u32,
    pub title: String,
}

impl ListedWindow {
    fn visible_on(&self, current_desktop: Option<i64>) -> bool {
        match current_desktop {
            Some(current) => self.desktop == current || self.desktop < 0,
            None => true,
        }
    }
}

/// Focused window as reported by xdotool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveWindow {
    pub id: u64,
    pub pid: u32,
    pub title: String,
}

/// Take a focus/window snapshot at `at`.
///
/// Fails only when both the window list and the focus query fail.
pub fn snapshot_windows(at: Timestamp) -> DeskreelResult<WindowSnapshot> {
    let listed = list_windows();
    let active = active_window(listed.as_deref().ok());

    match (listed, active) {
        (Err(list_err), Err(focus_err)) => Err(DeskreelError::acquisition(format!(
            "window list: {list_err}; focus: {focus_err}"
        ))),
        (listed, active) => {
            let mut problems = Vec::new();
            let windows = listed.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Window enumeration failed");
                problems.push(format!("window list: {e}"));
                Vec::new()
            });
            let active = active
                .map_err(|e| {
                    tracing::warn!(error = %e, "Focus query failed");
                    problems.push(format!("focus: {e}"));
                })
                .ok();
            let current_desktop = current_desktop().ok().flatten();
            let mut snapshot =
                assemble_snapshot(at, &windows, current_desktop, active.as_ref(), process_name);
            if !problems.is_empty() {
                snapshot.error = Some(problems.join("; "));
            }
            Ok(snapshot)
        }
    }
}

/// Build a snapshot from already-queried pieces.
///
/// `app_name_of` maps a pid to an application name.
pub fn assemble_snapshot(
    at: Timestamp,
    windows: &[ListedWindow],
    current_desktop: Option<i64>,
    active: Option<&ActiveWindow>,
    app_name_of: impl Fn(u32) -> String,
) -> WindowSnapshot {
    let records = windows
        .iter()
        .filter(|w| w.visible_on(current_desktop))
        .map(|w| WindowRecord {
            app_name: app_name_of(w.pid),
            window_name: w.title.clone(),
            owner_pid: w.pid,
            is_active: active.is_some_and(|a| a.pid != 0 && a.pid == w.pid),
            is_focused_window: active.is_some_and(|a| a.id == w.id),
        })
        .collect();

    let (focused_app_name, focused_app_pid, focused_window_name) = match active {
        Some(a) => (app_name_of(a.pid), a.pid, a.title.clone()),
        None => (UNKNOWN_APP.to_string(), 0, String::new()),
    };

    WindowSnapshot {
        timestamp: at,
        focused_app_name,
        focused_app_pid,
        focused_window_name,
        windows: records,
        error: None,
    }
}

/// Enumerate managed windows with `wmctrl -lp`.
pub fn list_windows() -> DeskreelResult<Vec<ListedWindow>> {
    let output = run_tool("wmctrl", &["-lp"])?;
    Ok(parse_wmctrl_list(&output))
}

/// Parse `wmctrl -lp` output.
///
/// ```text
/// 0x03a00003  0 4242   host cargo test - zsh
/// 0x01e00006 -1 1337   host Panel
/// ```
pub fn parse_wmctrl_list(output: &str) -> Vec<ListedWindow> {
    output
        .lines()
        .filter_map(|line| {
            let (id, rest) = next_field(line)?;
            let (desktop, rest) = next_field(rest)?;
            let (pid, rest) = next_field(rest)?;
            let (_host, title) = next_field(rest)?;
            Some(ListedWindow {
                id: parse_window_id(id)?,
                desktop: desktop.parse().ok()?,
                pid: pid.parse().ok()?,
                title: title.trim().to_string(),
            })
        })
        .collect()
}

/// Current desktop index from `wmctrl -d`, if one is marked.
pub fn current_desktop() -> DeskreelResult<Option<i64>> {
    let output = run_tool("wmctrl", &["-d"])?;
    Ok(parse_current_desktop(&output))
}

/// The desktop line flagged with `*` in `wmctrl -d` output.
pub fn parse_current_desktop(output: &str) -> Option<i64> {
    output.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let index = fields.next()?;
        (fields.next()? == "*").then(|| index.parse().ok()).flatten()
    })
}

/// Query the focused window.
///
/// When the window list is known the pid and title come from it, which
/// saves two helper invocations per cycle.
pub fn active_window(known: Option<&[ListedWindow]>) -> DeskreelResult<ActiveWindow> {
    let raw = run_tool("xdotool", &["getactivewindow"])?;
    let id = parse_window_id(raw.trim())
        .ok_or_else(|| DeskreelError::platform(format!("unexpected window id: {raw:?}")))?;

    if let Some(listed) = known.and_then(|ws| ws.iter().find(|w| w.id == id)) {
        return Ok(ActiveWindow {
            id,
            pid: listed.pid,
            title: listed.title.clone(),
        });
    }

    let id_arg = id.to_string();
    let pid = run_tool("xdotool", &["getwindowpid", &id_arg])
        .ok()
        .and_then(|out| out.trim().parse().ok())
        .unwrap_or(0);
    let title = run_tool("xdotool", &["getwindowname", &id_arg])
        .map(|out| out.trim_end_matches('\n').to_string())
        .unwrap_or_default();
    Ok(ActiveWindow { id, pid, title })
}

/// Short process name for `pid`, or `"Unknown"`.
pub fn process_name(pid: u32) -> String {
    if pid == 0 {
        return UNKNOWN_APP.to_string();
    }
    std::fs::read_to_string(format!("/proc/{pid}/comm"))
        .map(|name| name.trim().to_string())
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_APP.to_string())
}

/// Hex (`0x03a00003`) or decimal window ids.
fn parse_window_id(raw: &str) -> Option<u64> {
    match raw.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

/// Split off one whitespace-delimited field, keeping the remainder intact.
fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}
