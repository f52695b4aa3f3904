#![cfg(windows)]

/// Process entry point used by the `tuckbar` binary.
pub mod app;

/// Debugger output channel for warnings and errors.
pub mod debug;

/// DPI awareness for the host process.
pub mod dpi;

/// Loading the filter module and resolving its entry points.
pub mod filter_module;

/// Scoped `SetWindowsHookExW` registrations.
pub mod hooks;

/// Owner window, message pump and lifecycle effects.
pub mod host;

/// Named-mutex single-instance gate.
pub mod instance;

/// Tray context menu.
pub mod menu;

/// Monitor work areas.
pub mod monitor;

/// Executable paths and relaunching.
pub mod process;

/// Owned GDI regions.
pub mod region;

/// Taskbar discovery, state queries and region toggling.
pub mod taskbar;

/// Notification-area icon.
pub mod tray;

pub use taskbar::{Shell, TaskbarWindow};
