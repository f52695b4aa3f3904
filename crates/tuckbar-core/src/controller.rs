//! Host controller: reacts to window messages and drives the event loop.
//!
//! The platform crate supplies the message source ([`MessagePump`]) and
//! the side effects ([`Lifecycle`]); the decisions live here so they can
//! be exercised without an OS.

/// `WM_COMMAND`: a menu item was chosen.
pub const WM_COMMAND: u32 = 0x0111;

/// `WM_RBUTTONUP`, as reported in the low word of a tray callback.
pub const WM_RBUTTONUP: u32 = 0x0205;

/// `NIN_KEYSELECT`: the tray icon was activated from the keyboard.
pub const NIN_KEYSELECT: u32 = 0x0400 + 1;

/// Base of the application-private message range (`WM_APP`).
const WM_APP: u32 = 0x8000;

/// Callback message the tray icon posts to its owner window.
pub const TRAY_CALLBACK: u32 = WM_APP;

/// Internal request to leave the loop and start a fresh process.
pub const RESTART: u32 = WM_APP + 1;

/// Command id of the single "Exit" context-menu item.
pub const MENU_EXIT: u16 = 0;

/// How the event loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitResult {
    pub code: i32,
    pub restart: bool,
}

impl ExitResult {
    /// A normal exit that does not relaunch.
    pub fn quit(code: i32) -> Self {
        Self {
            code,
            restart: false,
        }
    }

    /// Leave the loop and relaunch the executable.
    pub fn restart() -> Self {
        Self {
            code: 0,
            restart: true,
        }
    }
}

/// What the controller does when the shell announces a new taskbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellRestartPolicy {
    /// Post [`RESTART`] and relaunch the whole process.
    Restart,
    /// Rebuild the tray icon and hooks in place.
    Recreate,
}

impl ShellRestartPolicy {
    pub fn from_flag(restart_on_new_taskbar: bool) -> Self {
        if restart_on_new_taskbar {
            Self::Restart
        } else {
            Self::Recreate
        }
    }
}

/// Effects the controller asks the platform to perform.
pub trait Lifecycle {
    /// Shows the tray context menu at the cursor.
    fn show_menu(&mut self);

    /// Requests a normal quit with the given code.
    fn quit(&mut self, code: i32);

    /// Posts [`RESTART`] to the controller's own queue.
    fn post_restart(&mut self);

    /// Ends the context menu's modal loop, if one is running.
    fn close_menu(&mut self);

    /// Replaces the tray icon with one carrying a fresh identity.
    fn recreate_tray(&mut self);

    /// Re-discovers the taskbar and replaces the hook pair.
    fn recreate_hooks(&mut self);
}

/// A single decision taken for one window message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    None,
    ShowMenu,
    Quit,
    PostRestart,
    /// A [`RESTART`] reached the window procedure, so a nested modal loop
    /// (the context menu) pulled it instead of [`run_loop`].
    ResumeRestart,
    Recreate,
}

/// Routes the owner window's messages to lifecycle effects.
#[derive(Debug, Clone, Copy)]
pub struct Controller {
    shell_recreated: u32,
    policy: ShellRestartPolicy,
}

impl Controller {
    /// `shell_recreated` is the runtime id of the shell's broadcast
    /// message announcing a freshly created taskbar.
    pub fn new(shell_recreated: u32, policy: ShellRestartPolicy) -> Self {
        Self {
            shell_recreated,
            policy,
        }
    }

    pub fn policy(&self) -> ShellRestartPolicy {
        self.policy
    }

    /// Decides what a message means without performing anything.
    pub fn react(&self, msg: u32, wparam: usize, lparam: isize) -> Reaction {
        match msg {
            WM_COMMAND if low_word(wparam) == MENU_EXIT => Reaction::Quit,
            RESTART => Reaction::ResumeRestart,
            TRAY_CALLBACK => match u32::from(low_word(lparam as usize)) {
                WM_RBUTTONUP | NIN_KEYSELECT => Reaction::ShowMenu,
                _ => Reaction::None,
            },
            m if m != 0 && m == self.shell_recreated => match self.policy {
                ShellRestartPolicy::Restart => Reaction::PostRestart,
                ShellRestartPolicy::Recreate => Reaction::Recreate,
            },
            _ => Reaction::None,
        }
    }

    /// Decides and performs the reaction to one message.
    pub fn handle(
        &self,
        msg: u32,
        wparam: usize,
        lparam: isize,
        lifecycle: &mut impl Lifecycle,
    ) -> Reaction {
        let reaction = self.react(msg, wparam, lparam);
        apply(reaction, lifecycle);
        reaction
    }
}

/// Performs a reaction's effects.
pub fn apply(reaction: Reaction, lifecycle: &mut impl Lifecycle) {
    match reaction {
        Reaction::None => {}
        Reaction::ShowMenu => lifecycle.show_menu(),
        Reaction::Quit => lifecycle.quit(0),
        Reaction::PostRestart => lifecycle.post_restart(),
        Reaction::ResumeRestart => {
            lifecycle.close_menu();
            lifecycle.post_restart();
        }
        Reaction::Recreate => {
            lifecycle.recreate_tray();
            lifecycle.recreate_hooks();
        }
    }
}

fn low_word(value: usize) -> u16 {
    (value & 0xFFFF) as u16
}

/// A message as seen by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub id: u32,
    pub wparam: usize,
    pub lparam: isize,
}

/// Result of waiting for the next message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetched {
    /// The OS asked the thread to quit with this code.
    Quit(i32),
    /// Retrieving a message failed.
    Failed,
    Message(Message),
}

/// A blocking, single-threaded message source.
pub trait MessagePump {
    /// Blocks until the next message is available.
    fn fetch(&mut self) -> Fetched;

    /// Translates and dispatches a message to its window procedure.
    fn dispatch(&mut self, msg: &Message);
}

/// Runs the loop until a quit, a failure, or a restart request.
pub fn run_loop(pump: &mut impl MessagePump) -> ExitResult {
    loop {
        match pump.fetch() {
            Fetched::Quit(code) => return ExitResult::quit(code),
            Fetched::Failed => return ExitResult::quit(0),
            Fetched::Message(msg) if msg.id == RESTART => return ExitResult::restart(),
            Fetched::Message(msg) => pump.dispatch(&msg),
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
