//! Per-message policy run by the filter module inside the shell.
//!
//! Everything here may be called concurrently and re-entrantly from
//! threads the host does not own. Nothing blocks, nothing is retained
//! past the call, and every failure is a silent no-op.

use crate::lazy::LazyState;

/// `WM_MOVE`: the taskbar window was moved.
pub const WM_MOVE: u32 = 0x0003;

/// Private notification the shell sends its taskbar on a task switch.
pub const TASK_SWITCHED: u32 = 0x0400 + 243;

/// State owned by one loaded instance of the filter module.
///
/// Built once, lazily, on the first qualifying message and never
/// modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessState {
    /// The taskbar window owned by the process the module is loaded into.
    pub taskbar: Option<usize>,
}

/// The subset of an intercepted message the policy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intercepted {
    pub message: u32,
    pub hwnd: usize,
}

/// What the policy did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Hide,
    Show,
}

/// Taskbar queries and effects the policy depends on.
pub trait TaskbarShell {
    /// Whether the taskbar currently reaches into the work area.
    fn is_visible(&self, taskbar: usize) -> bool;

    /// The shell's own auto-hide setting. Read-only input.
    fn autohide_enabled(&self) -> bool;

    fn hide(&self, taskbar: usize);

    fn show(&self, taskbar: usize);
}

/// Whether a message id is one the policy reacts to.
pub fn is_qualifying(message: u32) -> bool {
    message == WM_MOVE || message == TASK_SWITCHED
}

/// Applies the hide/show policy to one intercepted message.
///
/// `state` is only consulted for qualifying messages, so ordinary traffic
/// never triggers initialization. Returns the effect that was applied, or
/// `None` when the message was ignored.
pub fn filter_message<S, F>(
    info: Intercepted,
    state: &LazyState<ProcessState>,
    init: F,
    shell: &S,
) -> Option<Toggle>
where
    S: TaskbarShell,
    F: FnOnce() -> ProcessState,
{
    if !is_qualifying(info.message) {
        return None;
    }

    let taskbar = state.get_or_init(init)?.taskbar?;
    if taskbar != info.hwnd {
        return None;
    }

    if !shell.is_visible(taskbar) && shell.autohide_enabled() {
        shell.hide(taskbar);
        Some(Toggle::Hide)
    } else {
        shell.show(taskbar);
        Some(Toggle::Show)
    }
}
