use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};

/// Opts the host into per-monitor DPI awareness.
///
/// Taskbar and work-area rectangles are then reported in physical pixels,
/// matching what the filter module sees inside the (DPI-aware) shell.
/// Must run before the owner window is created. Failure (for example,
/// awareness already set by a manifest) is ignored.
pub fn enable_dpi_awareness() {
    // SAFETY: process-wide setting, called once before any window exists.
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }
}
