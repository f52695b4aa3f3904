//! Taskbar discovery, shell queries and region effects.
//!
//! Shared by the host (which discovers the taskbar to hook it) and the
//! filter module (which hides and shows it from inside the shell).

use std::mem;

use tuckbar_core::Rect;
use tuckbar_core::filter::TaskbarShell;
use tuckbar_core::visibility::{self, Edge, TaskbarSurface};
use windows::Win32::Foundation::{HWND, LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{GetRgnBox, GetWindowRgn, NULLREGION, RGN_ERROR, SetWindowRgn};
use windows::Win32::UI::Shell::{
    ABM_GETSTATE, ABM_GETTASKBARPOS, ABS_AUTOHIDE, APPBARDATA, SHAppBarMessage,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetClassNameW, GetWindowRect, GetWindowThreadProcessId,
};
use windows::core::BOOL;

use crate::monitor;
use crate::region::Region;

/// Window class of the shell's primary taskbar.
pub const TASKBAR_CLASS: &str = "Shell_TrayWnd";

/// Longest class name we bother reading; longer names can't match.
const MAX_CLASS_LEN: usize = 64;

struct Search {
    pid: Option<u32>,
    found: Option<HWND>,
}

/// Finds the first top-level taskbar window, in any process.
pub fn find_taskbar() -> Option<HWND> {
    search(None)
}

/// Finds the taskbar window owned by process `pid`.
///
/// The filter module uses this with its own process id, so it only ever
/// acts on the taskbar of the shell it was loaded into.
pub fn find_taskbar_of_process(pid: u32) -> Option<HWND> {
    search(Some(pid))
}

fn search(pid: Option<u32>) -> Option<HWND> {
    let mut search = Search { pid, found: None };

    // SAFETY: EnumWindows runs synchronously, so the pointer to `search`
    // stays valid for every callback. Stopping early makes EnumWindows
    // report an error, which carries no information here.
    unsafe {
        let _ = EnumWindows(
            Some(enum_taskbar_callback),
            LPARAM(&mut search as *mut Search as isize),
        );
    }

    search.found
}

unsafe extern "system" fn enum_taskbar_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam points to the Search owned by `search()`.
    let search = unsafe { &mut *(lparam.0 as *mut Search) };

    if let Some(pid) = search.pid {
        let mut owner = 0u32;
        // SAFETY: simple query; writes the owning process id.
        unsafe { GetWindowThreadProcessId(hwnd, Some(&mut owner)) };
        if owner != pid {
            return BOOL(1);
        }
    }

    if is_taskbar_class(hwnd) {
        search.found = Some(hwnd);
        return BOOL(0);
    }

    BOOL(1)
}

fn is_taskbar_class(hwnd: HWND) -> bool {
    let mut buffer = [0u16; MAX_CLASS_LEN];
    // SAFETY: GetClassNameW writes at most buffer.len() code units.
    let len = unsafe { GetClassNameW(hwnd, &mut buffer) };
    let Ok(len) = usize::try_from(len) else {
        return false;
    };
    buffer[..len].iter().copied().eq(TASKBAR_CLASS.encode_utf16())
}

/// Reads the shell's own auto-hide setting. Never written.
pub fn autohide_enabled() -> bool {
    let mut data = appbar_data();
    // SAFETY: SHAppBarMessage reads cbSize and returns the state bits.
    let state = unsafe { SHAppBarMessage(ABM_GETSTATE, &mut data) };
    (state as u32 & ABS_AUTOHIDE) != 0
}

/// The screen edge the taskbar is docked to.
pub fn taskbar_edge() -> Edge {
    let mut data = appbar_data();
    // SAFETY: SHAppBarMessage fills `data` with the taskbar position.
    let ok = unsafe { SHAppBarMessage(ABM_GETTASKBARPOS, &mut data) };
    if ok == 0 {
        return Edge::Unknown;
    }
    Edge::from_raw(data.uEdge)
}

fn appbar_data() -> APPBARDATA {
    APPBARDATA {
        cbSize: mem::size_of::<APPBARDATA>() as u32,
        ..Default::default()
    }
}

/// A non-owning reference to a taskbar window.
#[derive(Debug, Clone, Copy)]
pub struct TaskbarWindow {
    hwnd: HWND,
}

impl TaskbarWindow {
    pub fn new(hwnd: HWND) -> Self {
        Self { hwnd }
    }

    pub fn from_raw(handle: usize) -> Self {
        Self::new(HWND(handle as *mut _))
    }

    /// Whether the taskbar reaches into its monitor's work area.
    ///
    /// Anything we fail to query counts as visible, which resolves to the
    /// harmless "show" branch of the filter.
    pub fn is_visible(&self) -> bool {
        let (Some(rect), Some(work)) = (
            self.window_rect(),
            monitor::work_area_for_window(self.hwnd),
        ) else {
            return true;
        };
        visibility::is_visible(taskbar_edge(), &rect, &work)
    }

    pub fn show(&self) -> bool {
        visibility::show(self)
    }

    pub fn hide(&self) -> bool {
        visibility::hide(self)
    }
}

impl TaskbarSurface for TaskbarWindow {
    fn window_rect(&self) -> Option<Rect> {
        let mut rc = RECT::default();
        // SAFETY: GetWindowRect fills `rc` for a valid HWND.
        unsafe { GetWindowRect(self.hwnd, &mut rc) }.ok()?;
        Some(Rect::new(rc.left, rc.top, rc.right, rc.bottom))
    }

    fn region_box(&self) -> Option<Rect> {
        let region = Region::empty()?;

        // SAFETY: GetWindowRgn copies the window's region into ours.
        let kind = unsafe { GetWindowRgn(self.hwnd, region.handle()) };
        if kind == NULLREGION || kind == RGN_ERROR {
            return None;
        }

        let mut rc = RECT::default();
        // SAFETY: GetRgnBox reads the bounding box of a region we own.
        unsafe { GetRgnBox(region.handle(), &mut rc) };
        Some(Rect::new(rc.left, rc.top, rc.right, rc.bottom))
    }

    fn set_region(&self, region: Option<Rect>) {
        match region {
            None => {
                // SAFETY: a null region removes the window's custom region.
                unsafe { SetWindowRgn(self.hwnd, None, true) };
            }
            Some(rect) => {
                let Some(region) = Region::from_rect(&rect) else {
                    return;
                };
                // SAFETY: on success the system takes ownership of the
                // region; on failure it stays ours and is deleted on drop.
                let adopted = unsafe { SetWindowRgn(self.hwnd, Some(region.handle()), true) };
                if adopted != 0 {
                    region.give_to_system();
                }
            }
        }
    }
}

/// The live shell, as seen by the filter policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shell;

impl TaskbarShell for Shell {
    fn is_visible(&self, taskbar: usize) -> bool {
        TaskbarWindow::from_raw(taskbar).is_visible()
    }

    fn autohide_enabled(&self) -> bool {
        autohide_enabled()
    }

    fn hide(&self, taskbar: usize) {
        TaskbarWindow::from_raw(taskbar).hide();
    }

    fn show(&self, taskbar: usize) {
        TaskbarWindow::from_raw(taskbar).show();
    }
}

/// Removes any hide region from the current taskbar, if there is one.
pub fn show_current_taskbar() {
    if let Some(hwnd) = find_taskbar() {
        TaskbarWindow::new(hwnd).show();
    }
}
