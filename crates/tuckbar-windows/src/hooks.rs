use tuckbar_core::SetupResult;
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    GetWindowThreadProcessId, HHOOK, SetWindowsHookExW, UnhookWindowsHookEx, WH_CALLWNDPROCRET,
    WH_GETMESSAGE, WINDOWS_HOOK_ID,
};

use crate::filter_module::{FilterModule, HookFn};

/// One installed hook, removed on drop.
pub struct Hook(HHOOK);

impl Hook {
    fn install(
        kind: WINDOWS_HOOK_ID,
        proc: HookFn,
        module: &FilterModule,
        thread_id: u32,
    ) -> SetupResult<Self> {
        // SAFETY: `proc` lives in `module`, which the caller keeps loaded
        // for longer than the hook. The OS maps the module into the
        // process owning `thread_id`.
        let handle =
            unsafe { SetWindowsHookExW(kind, Some(proc), Some(module.instance()), thread_id)? };
        Ok(Self(handle))
    }
}

impl Drop for Hook {
    fn drop(&mut self) {
        // SAFETY: we own the registration.
        unsafe {
            let _ = UnhookWindowsHookEx(self.0);
        }
    }
}

/// The two filter hooks on the taskbar's thread.
///
/// Auto-hide signals arrive either as sent messages (seen after the
/// window procedure returns) or as posted ones (seen when pulled from the
/// queue), depending on shell version and state, so both are needed.
pub struct HookPair {
    _sync: Hook,
    _get_message: Hook,
}

impl HookPair {
    /// Installs both hooks on the thread that owns `taskbar`.
    ///
    /// If the second install fails, the first hook is removed before the
    /// error is returned.
    pub fn install(taskbar: HWND, module: &FilterModule) -> SetupResult<Self> {
        // SAFETY: simple query; returns 0 for a dead window.
        let thread_id = unsafe { GetWindowThreadProcessId(taskbar, None) };
        if thread_id == 0 {
            return Err("taskbar window has no owning thread".into());
        }

        let sync = Hook::install(WH_CALLWNDPROCRET, module.sync_filter(), module, thread_id)?;
        let get_message = Hook::install(
            WH_GETMESSAGE,
            module.get_message_filter(),
            module,
            thread_id,
        )?;

        Ok(Self {
            _sync: sync,
            _get_message: get_message,
        })
    }
}
