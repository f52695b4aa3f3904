use std::path::Path;

use tuckbar_core::SetupResult;
use tuckbar_core::capability::{self, FILTER_ENTRY_POINTS};
use windows::Win32::Foundation::{FreeLibrary, HINSTANCE, HMODULE, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::core::{HSTRING, PCSTR};

/// Signature of a `SetWindowsHookExW` callback.
pub type HookFn = unsafe extern "system" fn(i32, WPARAM, LPARAM) -> LRESULT;

/// The filter module, loaded into this process, with its entry points.
///
/// Resolution is all-or-nothing: a `FilterModule` only exists if every
/// entry point was found. The module stays loaded until drop, so the
/// entry points remain valid for as long as any hook uses them.
pub struct FilterModule {
    module: HMODULE,
    sync: HookFn,
    get_message: HookFn,
}

impl FilterModule {
    /// Loads the module at `path` and resolves both filter entry points.
    pub fn load(path: &Path) -> SetupResult<Self> {
        let wide = HSTRING::from(path.as_os_str());

        // SAFETY: LoadLibraryW loads a DLL by full path. Its DllMain does
        // nothing, so loading it into the host is side-effect free.
        let module = unsafe { LoadLibraryW(&wide) }
            .map_err(|e| format!("LoadLibraryW {}: {e}", path.display()))?;

        let resolved = capability::resolve_all(FILTER_ENTRY_POINTS, |name| {
            let symbol: Vec<u8> = name.bytes().chain(Some(0)).collect();
            // SAFETY: `symbol` is a NUL-terminated ASCII export name and
            // `module` is loaded.
            let proc = unsafe { GetProcAddress(module, PCSTR(symbol.as_ptr())) }?;
            // SAFETY: the filter module exports these names with exactly
            // the hook procedure signature.
            Some(unsafe { std::mem::transmute::<_, HookFn>(proc) })
        });

        match resolved {
            Ok([sync, get_message]) => Ok(Self {
                module,
                sync,
                get_message,
            }),
            Err(missing) => {
                // SAFETY: nothing resolved from the module escapes.
                unsafe {
                    let _ = FreeLibrary(module);
                }
                Err(missing.into())
            }
        }
    }

    /// Handle passed to `SetWindowsHookExW` so the OS can map the module
    /// into the hooked thread's process.
    pub fn instance(&self) -> HINSTANCE {
        HINSTANCE(self.module.0)
    }

    /// Filter for messages after the window procedure handled them.
    pub fn sync_filter(&self) -> HookFn {
        self.sync
    }

    /// Filter for messages still in the thread's queue.
    pub fn get_message_filter(&self) -> HookFn {
        self.get_message
    }
}

impl Drop for FilterModule {
    fn drop(&mut self) {
        // SAFETY: owners drop their hooks before the module they came from.
        unsafe {
            let _ = FreeLibrary(self.module);
        }
    }
}
