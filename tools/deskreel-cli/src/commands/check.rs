//! Check system capabilities.

#[cfg(target_os = "linux")]
pub fn run() -> anyhow::Result<()> {
    use deskreel_platform_core::{virtual_desktop_bounds, DisplayServer, LockState};
    use deskreel_platform_linux::permissions::{
        check_capabilities, missing_required, print_capability_report,
    };
    use deskreel_platform_linux::{detect_display_server, detect_monitors, query_lock_state};

    println!("deskreel System Check");
    println!("{}", "=".repeat(50));

    match detect_display_server() {
        DisplayServer::X11 => println!("[OK] Display server: X11"),
        DisplayServer::Wayland => {
            println!("[WARN] Display server: Wayland (window listing needs XWayland)")
        }
        _ => println!("[WARN] Display server: Unknown"),
    }

    match detect_monitors() {
        Ok(monitors) => {
            println!("[OK] Monitors detected: {}", monitors.len());
            for m in &monitors {
                println!(
                    "     {} {}x{} at ({}, {}) {}",
                    m.name,
                    m.width,
                    m.height,
                    m.x,
                    m.y,
                    if m.primary { "(primary)" } else { "" }
                );
            }
            if let Some((x, y, w, h)) = virtual_desktop_bounds(&monitors) {
                println!("     Virtual desktop: {w}x{h} at ({x}, {y})");
            }
        }
        Err(e) => println!("[WARN] Monitors: {e}"),
    }

    match query_lock_state() {
        Ok(LockState::Locked) => println!("[OK] Session lock state: locked"),
        Ok(LockState::Unlocked) => println!("[OK] Session lock state: unlocked"),
        Err(e) => println!("[WARN] Session lock state unavailable ({e}); captures never pause"),
    }

    let capabilities = check_capabilities();
    println!();
    print_capability_report(&capabilities);

    let native_capture = cfg!(feature = "native-capture");
    if native_capture {
        println!("[OK] Monitor capture: xcap");
    } else {
        println!("[WARN] Monitor capture: built without native-capture, no frames will be stored");
    }

    println!();
    if missing_required(&capabilities) {
        println!("Some required capabilities are missing. See above for fixes.");
    } else if !native_capture {
        println!("Only the window log will be recorded. Rebuild with default features to store frames.");
    } else {
        println!("All required capabilities are available. deskreel is ready.");
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn run() -> anyhow::Result<()> {
    println!("deskreel System Check");
    println!("{}", "=".repeat(50));
    println!("[WARN] Lock state and window listing are only implemented on Linux.");
    Ok(())
}
