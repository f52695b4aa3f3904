use std::os::windows::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tuckbar_core::SetupResult;

/// File name of the filter module, built from the `tuckbar-hook` crate.
pub const HOOK_MODULE: &str = "tuckbar_hook.dll";

/// `DETACHED_PROCESS`: the relaunched instance gets no console.
const DETACHED_PROCESS: u32 = 0x0000_0008;

/// Path of the running executable.
pub fn exe_path() -> SetupResult<PathBuf> {
    Ok(std::env::current_exe()?)
}

/// The filter module is expected next to the executable.
pub fn hook_path(exe: &Path) -> SetupResult<PathBuf> {
    let dir = exe
        .parent()
        .ok_or("executable path has no parent directory")?;
    Ok(dir.join(HOOK_MODULE))
}

/// Starts a fresh copy of `exe` with no arguments and does not wait.
///
/// Call only after the instance guard is released: a copy started while
/// it is still held finds the mutex taken and exits immediately.
pub fn relaunch(exe: &Path) {
    let spawned = Command::new(exe)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .creation_flags(DETACHED_PROCESS)
        .spawn();

    match spawned {
        Ok(child) => tuckbar_core::log_info!("Relaunched as PID {}", child.id()),
        Err(e) => tuckbar_core::log_error!("relaunch {}: {e}", exe.display()),
    }
}
