use std::mem;

use tuckbar_core::controller::TRAY_CALLBACK;
use windows::Win32::Foundation::{HINSTANCE, HWND};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Shell::{
    NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NIM_SETVERSION, NOTIFYICON_VERSION,
    NOTIFYICONDATAW, Shell_NotifyIconW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, HICON, IDI_APPLICATION, IMAGE_ICON, LR_DEFAULTCOLOR, LoadIconW, LoadImageW,
    SM_CXSMICON,
};
use windows::core::PCWSTR;

const TOOLTIP: &str = "Tuckbar";

/// Resource id of the application icon embedded in the executable.
const ICON_RESOURCE: u16 = 1;

/// A notification-area icon, removed from the tray on drop.
pub struct TrayIcon {
    data: NOTIFYICONDATAW,
}

impl TrayIcon {
    /// Adds an icon owned by `owner` and negotiates callback version 3.
    ///
    /// Returns `None` if either step fails; an icon that was added but
    /// could not be upgraded is removed again.
    pub fn create(owner: HWND, icon: HICON, id: u32) -> Option<Self> {
        // SAFETY: NOTIFYICONDATAW is plain data; all-zero is a valid value.
        let mut data: NOTIFYICONDATAW = unsafe { mem::zeroed() };
        data.cbSize = mem::size_of::<NOTIFYICONDATAW>() as u32;
        data.hWnd = owner;
        data.uID = id;
        data.uFlags = NIF_MESSAGE | NIF_TIP | NIF_ICON;
        data.uCallbackMessage = TRAY_CALLBACK;
        data.hIcon = icon;
        data.Anonymous.uVersion = NOTIFYICON_VERSION;
        copy_tip(&mut data.szTip, TOOLTIP);

        // SAFETY: `data` is fully initialised for NIM_ADD.
        if !unsafe { Shell_NotifyIconW(NIM_ADD, &data) }.as_bool() {
            return None;
        }

        // From here on the icon exists, so dropping `tray` removes it.
        let tray = Self { data };
        // SAFETY: same struct, uVersion already set.
        if !unsafe { Shell_NotifyIconW(NIM_SETVERSION, &tray.data) }.as_bool() {
            return None;
        }

        Some(tray)
    }

    pub fn id(&self) -> u32 {
        self.data.uID
    }
}

impl Drop for TrayIcon {
    fn drop(&mut self) {
        // SAFETY: hWnd + uID identify the icon we added.
        unsafe {
            let _ = Shell_NotifyIconW(NIM_DELETE, &self.data);
        }
    }
}

/// Copies `text` into a fixed, NUL-terminated UTF-16 buffer, truncating.
fn copy_tip(dst: &mut [u16], text: &str) {
    let Some(room) = dst.len().checked_sub(1) else {
        return;
    };
    let mut written = 0;
    for (slot, unit) in dst.iter_mut().zip(text.encode_utf16().take(room)) {
        *slot = unit;
        written += 1;
    }
    dst[written] = 0;
}

/// Loads the small application icon, falling back to the stock one.
pub fn load_icon() -> Option<HICON> {
    // SAFETY: small-icon width is a plain metric query.
    let size = unsafe { GetSystemMetrics(SM_CXSMICON) };

    // SAFETY: a null module name yields the executable's own module.
    let own = unsafe { GetModuleHandleW(PCWSTR::null()) }
        .ok()
        .and_then(|module| {
            // SAFETY: MAKEINTRESOURCE-style id; a missing resource is an Err.
            unsafe {
                LoadImageW(
                    Some(HINSTANCE(module.0)),
                    PCWSTR(ICON_RESOURCE as usize as *const u16),
                    IMAGE_ICON,
                    size,
                    size,
                    LR_DEFAULTCOLOR,
                )
            }
            .ok()
        })
        .map(|handle| HICON(handle.0));

    // SAFETY: stock icons need no module.
    own.or_else(|| unsafe { LoadIconW(None, IDI_APPLICATION) }.ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tip_is_nul_terminated() {
        let mut buf = [0xFFFFu16; 16];
        copy_tip(&mut buf, "Tuckbar");
        assert_eq!(&buf[..8], &"Tuckbar\0".encode_utf16().collect::<Vec<_>>()[..]);
    }

    #[test]
    fn long_tip_is_truncated() {
        let mut buf = [0xFFFFu16; 4];
        copy_tip(&mut buf, "Tuckbar");
        assert_eq!(buf, [b'T' as u16, b'u' as u16, b'c' as u16, 0]);
    }
}
