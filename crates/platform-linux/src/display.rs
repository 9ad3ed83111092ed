//! Display server and monitor layout detection.

use deskreel_common::error::{DeskreelError, DeskreelResult};
use deskreel_platform_core::{stitch_order, DisplayServer, MonitorInfo};

use crate::tool::run_tool;

/// Detect the current display server.
pub fn detect_display_server() -> DisplayServer {
    if std::env::var("WAYLAND_DISPLAY").is_ok() {
        DisplayServer::Wayland
    } else if std::env::var("DISPLAY").is_ok() {
        DisplayServer::X11
    } else {
        DisplayServer::Unknown
    }
}

/// Detect connected monitors via `xrandr --listmonitors`, in stitch order.
///
/// An empty listing is an error: a desktop without monitors cannot be
/// captured.
pub fn detect_monitors() -> DeskreelResult<Vec<MonitorInfo>> {
    tracing::debug!("Detecting monitors");
    let output = run_tool("xrandr", &["--listmonitors"])?;
    let mut monitors = parse_listmonitors(&output);
    if monitors.is_empty() {
        return Err(DeskreelError::acquisition("xrandr reported no monitors"));
    }
    stitch_order(&mut monitors);
    Ok(monitors)
}

/// Parse `xrandr --listmonitors` output.
///
/// ```text
/// Monitors: 2
///  0: +*DP-1 2560/597x1440/336+0+0  DP-1
///  1: +HDMI-1 1920/477x1080/268+2560+0  HDMI-1
/// ```
pub fn parse_listmonitors(output: &str) -> Vec<MonitorInfo> {
    output
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let index = tokens.next()?;
            if !index.ends_with(':') {
                return None;
            }
            let flags = tokens.next()?;
            let geometry = tokens.next()?;
            let (width, height, x, y) = parse_geometry(geometry)?;
            let name = tokens
                .last()
                .map(str::to_string)
                .unwrap_or_else(|| flags.trim_start_matches(['+', '*']).to_string());
            Some(MonitorInfo {
                name,
                width,
                height,
                x,
                y,
                primary: flags.contains('*'),
            })
        })
        .collect()
}

/// `2560/597x1440/336+0+0` → `(2560, 1440, 0, 0)`.
fn parse_geometry(geometry: &str) -> Option<(u32, u32, i32, i32)> {
    let (w_part, rest) = geometry.split_once('x')?;
    let width = w_part.split('/').next()?.parse().ok()?;

    let offsets_at = rest.find('+')?;
    let (h_part, offsets) = rest.split_at(offsets_at);
    let height = h_part.split('/').next()?.parse().ok()?;

    let mut coords = offsets[1..].split('+');
    let x = coords.next()?.parse().ok()?;
    let y = coords.next()?.parse().ok()?;
    Some((width, height, x, y))
}
