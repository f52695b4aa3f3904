use tuckbar_core::SetupResult;
use tuckbar_core::controller::MENU_EXIT;
use windows::Win32::Foundation::{HWND, POINT};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, DestroyMenu, GetCursorPos, HMENU, MF_STRING, SetForegroundWindow,
    TPM_RIGHTBUTTON, TrackPopupMenu,
};
use windows::core::w;

/// The tray icon's context menu, destroyed on drop.
pub struct ContextMenu(HMENU);

impl ContextMenu {
    /// Builds the menu with its single "Exit" item.
    pub fn new() -> SetupResult<Self> {
        // SAFETY: creates an empty menu we own.
        let menu = Self(unsafe { CreatePopupMenu()? });
        // SAFETY: appends to the menu created above.
        unsafe { AppendMenuW(menu.0, MF_STRING, usize::from(MENU_EXIT), w!("E&xit"))? };
        Ok(menu)
    }

    pub fn handle(&self) -> HMENU {
        self.0
    }
}

impl Drop for ContextMenu {
    fn drop(&mut self) {
        // SAFETY: we own the menu.
        unsafe {
            let _ = DestroyMenu(self.0);
        }
    }
}

/// Shows `menu` at the cursor. The chosen item arrives at `owner` as
/// `WM_COMMAND`.
///
/// The owner is brought to the foreground first, otherwise the menu
/// doesn't close when the user clicks elsewhere.
pub fn show_at_cursor(menu: HMENU, owner: HWND) {
    let mut pt = POINT::default();
    // SAFETY: plain Win32 calls on handles we own; TrackPopupMenu runs a
    // modal loop that re-enters the owner's window procedure.
    unsafe {
        if GetCursorPos(&mut pt).is_err() {
            return;
        }
        let _ = SetForegroundWindow(owner);
        let _ = TrackPopupMenu(menu, TPM_RIGHTBUTTON, pt.x, pt.y, Some(0), owner, None);
    }
}
