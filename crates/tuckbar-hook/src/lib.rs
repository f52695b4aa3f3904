//! Filter module loaded into the shell's process by the host's hooks.
//!
//! Both entry points run on the taskbar's thread, inside the shell. They
//! must never block, panic or log, and always hand the message on to the
//! next hook.

#![cfg(windows)]

use tuckbar_core::filter::{self, Intercepted, ProcessState};
use tuckbar_core::lazy::LazyState;
use tuckbar_windows::taskbar::{self, Shell};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentProcessId;
use windows::Win32::UI::WindowsAndMessaging::{CallNextHookEx, CWPRETSTRUCT, MSG};

/// Per-process state, created on the first qualifying message.
static STATE: LazyState<ProcessState> = LazyState::new();

fn state() -> &'static LazyState<ProcessState> {
    &STATE
}

/// Finds the taskbar that belongs to the process we were loaded into.
fn discover() -> ProcessState {
    // SAFETY: no preconditions.
    let pid = unsafe { GetCurrentProcessId() };
    ProcessState {
        taskbar: taskbar::find_taskbar_of_process(pid).map(|hwnd| hwnd.0 as usize),
    }
}

fn apply(info: Intercepted) {
    let _ = filter::filter_message(info, state(), discover, &Shell);
}

/// `WH_CALLWNDPROCRET` procedure: sees sent messages after the taskbar's
/// window procedure has handled them.
///
/// # Safety
///
/// Called by the system only; for `code >= 0`, `lparam` points to a
/// `CWPRETSTRUCT`.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn tuckbar_filter_sync_messages(
    code: i32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if code >= 0 {
        // SAFETY: guaranteed by the hook contract for non-negative codes.
        if let Some(data) = unsafe { (lparam.0 as *const CWPRETSTRUCT).as_ref() } {
            apply(Intercepted {
                message: data.message,
                hwnd: data.hwnd.0 as usize,
            });
        }
    }
    // SAFETY: forwarding the arguments we were given.
    unsafe { CallNextHookEx(None, code, wparam, lparam) }
}

/// `WH_GETMESSAGE` procedure: sees posted messages as the taskbar's
/// thread pulls them from its queue.
///
/// # Safety
///
/// Called by the system only; for `code >= 0`, `lparam` points to a `MSG`.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn tuckbar_filter_async_messages(
    code: i32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if code >= 0 {
        // SAFETY: guaranteed by the hook contract for non-negative codes.
        if let Some(msg) = unsafe { (lparam.0 as *const MSG).as_ref() } {
            apply(Intercepted {
                message: msg.message,
                hwnd: msg.hwnd.0 as usize,
            });
        }
    }
    // SAFETY: forwarding the arguments we were given.
    unsafe { CallNextHookEx(None, code, wparam, lparam) }
}
