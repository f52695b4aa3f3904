use std::mem;

use tuckbar_core::Rect;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MONITOR_DEFAULTTONEAREST, MONITORINFO, MonitorFromWindow,
};

/// Returns the work area of the monitor nearest to the given window.
///
/// The work area excludes the taskbar and any docked toolbars, so an
/// auto-hidden taskbar sits just outside it.
pub fn work_area_for_window(hwnd: HWND) -> Option<Rect> {
    // SAFETY: MonitorFromWindow with MONITOR_DEFAULTTONEAREST always
    // returns a monitor, even for a stale HWND.
    let monitor = unsafe { MonitorFromWindow(hwnd, MONITOR_DEFAULTTONEAREST) };

    let mut info = MONITORINFO {
        cbSize: mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };

    // SAFETY: GetMonitorInfoW fills the MONITORINFO struct; cbSize is set
    // as the API requires.
    let success = unsafe { GetMonitorInfoW(monitor, &mut info) };
    if !success.as_bool() {
        return None;
    }

    let rc = info.rcWork;
    Some(Rect::new(rc.left, rc.top, rc.right, rc.bottom))
}
