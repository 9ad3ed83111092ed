//! Capability detection and guidance for Linux.
//!
//! deskreel shells out to a handful of desktop helpers. Each one is
//! optional in the sense that the daemon keeps running without it, but
//! the corresponding part of every cycle degrades.

use crate::tool::tool_on_path;

/// A system capability that deskreel may need.
#[derive(Debug, Clone)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

/// Check all capabilities and report status.
pub fn check_capabilities() -> Vec<Capability> {
    vec![
        check_display_session(),
        check_helper(
            "xrandr",
            "Monitor layout discovery for multi-monitor capture",
            true,
            "sudo apt install x11-xserver-utils",
        ),
        check_helper(
            "loginctl",
            "Session lock state (captures are skipped while locked)",
            false,
            "Install systemd-logind or run inside a logind session",
        ),
        check_helper(
            "wmctrl",
            "Visible window enumeration for the event log",
            false,
            "sudo apt install wmctrl",
        ),
        check_helper(
            "xdotool",
            "Focused window detection for the event log",
            false,
            "sudo apt install xdotool",
        ),
    ]
}

/// Whether any of the required capabilities is missing.
pub fn missing_required(capabilities: &[Capability]) -> bool {
    capabilities.iter().any(|cap| cap.required && !cap.available)
}

fn check_display_session() -> Capability {
    let available = std::env::var("WAYLAND_DISPLAY").is_ok() || std::env::var("DISPLAY").is_ok();

    Capability {
        name: "Display Session".to_string(),
        description: "Graphical session to capture from".to_string(),
        available,
        required: true,
        fix_instructions: if !available {
            Some("Run deskreel from within a graphical desktop session".to_string())
        } else {
            None
        },
    }
}

fn check_helper(program: &str, description: &str, required: bool, fix: &str) -> Capability {
    let available = tool_on_path(program);
    Capability {
        name: program.to_string(),
        description: description.to_string(),
        available,
        required,
        fix_instructions: (!available).then(|| fix.to_string()),
    }
}

/// Print a user-friendly capability report.
pub fn print_capability_report(capabilities: &[Capability]) {
    println!("deskreel System Capabilities:");
    println!("{}", "-".repeat(60));

    for cap in capabilities {
        let status = if cap.available {
            "[OK]"
        } else if cap.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        };

        println!("  {} {}: {}", status, cap.name, cap.description);

        if let Some(ref fix) = cap.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}
