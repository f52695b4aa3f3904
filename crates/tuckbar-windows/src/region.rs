use tuckbar_core::Rect;
use windows::Win32::Graphics::Gdi::{CreateRectRgn, DeleteObject, HGDIOBJ, HRGN};

/// An owned GDI region, deleted on drop.
///
/// Once a region is handed to `SetWindowRgn` successfully the system owns
/// it; [`Region::give_to_system`] forgets it so it is not deleted twice.
pub struct Region(HRGN);

impl Region {
    /// Creates a rectangular region. `None` if GDI is out of handles.
    pub fn from_rect(rect: &Rect) -> Option<Self> {
        // SAFETY: CreateRectRgn only allocates a GDI object.
        let handle = unsafe { CreateRectRgn(rect.left, rect.top, rect.right, rect.bottom) };
        (!handle.is_invalid()).then_some(Self(handle))
    }

    /// An empty region to receive a copy of a window's region.
    pub fn empty() -> Option<Self> {
        Self::from_rect(&Rect::default())
    }

    pub fn handle(&self) -> HRGN {
        self.0
    }

    /// Gives up ownership after the system has adopted the region.
    pub fn give_to_system(self) {
        std::mem::forget(self);
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        // SAFETY: we own the handle; nobody else has been given it.
        unsafe {
            let _ = DeleteObject(HGDIOBJ(self.0.0));
        }
    }
}
