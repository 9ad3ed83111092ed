//! Running external desktop helpers.

use std::io::ErrorKind;
use std::process::Command;

use deskreel_common::error::{DeskreelError, DeskreelResult};

/// Run `program` with `args` and return its stdout.
///
/// A missing binary and a non-zero exit are both reported as platform
/// errors naming the tool.
pub fn run_tool(program: &str, args: &[&str]) -> DeskreelResult<String> {
    let output = Command::new(program).args(args).output().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            DeskreelError::platform(format!("{program} is not installed"))
        } else {
            DeskreelError::platform(format!("failed to run {program}: {e}"))
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DeskreelError::platform(format!(
            "{program} {} exited with {}: {}",
            args.join(" "),
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Whether `program` resolves to an executable on `PATH`.
pub fn tool_on_path(program: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths).any(|dir| dir.join(program).is_file())
        })
        .unwrap_or(false)
}
