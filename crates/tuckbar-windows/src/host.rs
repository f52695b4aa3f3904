//! The host controller's window, message pump and lifecycle effects.
//!
//! Everything here runs on the single thread that called [`run`]. The
//! owner window's procedure and the pump share state through a
//! thread-local, borrowed only briefly and never across calls that can
//! re-enter the window procedure (menus, shell notifications).

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use tuckbar_core::config::Config;
use tuckbar_core::controller::{
    self, Controller, ExitResult, Fetched, Lifecycle, Message, MessagePump, RESTART,
};
use tuckbar_core::tray::TrayIds;
use tuckbar_core::{SetupResult, log_info, log_warn};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, EndMenu, GetMessageW, HICON,
    MSG, PostMessageW, PostQuitMessage, RegisterClassW, RegisterWindowMessageW, TranslateMessage,
    WNDCLASSW, WS_EX_TOOLWINDOW,
};
use windows::core::w;

use crate::dpi;
use crate::filter_module::FilterModule;
use crate::hooks::HookPair;
use crate::menu::{self, ContextMenu};
use crate::taskbar;
use crate::tray::{self, TrayIcon};

thread_local! {
    static HOST: RefCell<Option<HostState>> = const { RefCell::new(None) };
}

/// Everything the owner window's procedure may need to touch.
///
/// Field order matters: fields drop top to bottom, so the hooks are
/// removed before the module their procedures live in is unloaded.
struct HostState {
    controller: Controller,
    owner: HWND,
    icon: HICON,
    tray_ids: TrayIds,
    hooks: Option<HookPair>,
    tray: Option<TrayIcon>,
    menu: ContextMenu,
    module: Rc<FilterModule>,
}

/// The hidden window that owns the tray icon and receives broadcasts.
struct OwnerWindow(HWND);

impl OwnerWindow {
    /// Must NOT be a message-only window (`HWND_MESSAGE` parent): those
    /// never see the shell's broadcast. A regular hidden tool window does.
    fn create() -> SetupResult<Self> {
        let class_name = w!("TuckbarOwner");
        let wc = WNDCLASSW {
            lpfnWndProc: Some(owner_proc),
            lpszClassName: class_name,
            ..Default::default()
        };

        // SAFETY: registers a class whose procedure is `owner_proc`.
        if unsafe { RegisterClassW(&wc) } == 0 {
            return Err("RegisterClassW TuckbarOwner failed".into());
        }

        // WS_EX_TOOLWINDOW: no taskbar button. No WS_VISIBLE: stays hidden.
        // SAFETY: the class was registered above.
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_TOOLWINDOW,
                class_name,
                w!("tuckbar"),
                Default::default(),
                0,
                0,
                1,
                1,
                None,
                None,
                None,
                None,
            )?
        };

        Ok(Self(hwnd))
    }
}

impl Drop for OwnerWindow {
    fn drop(&mut self) {
        // SAFETY: we created the window on this thread.
        unsafe {
            let _ = DestroyWindow(self.0);
        }
    }
}

/// Runs the controller until quit or restart.
///
/// Any `Err` is a setup failure: nothing was left half-running, because
/// every acquired resource is dropped on the way out.
pub fn run(config: &Config, hook_path: &Path) -> SetupResult<ExitResult> {
    dpi::enable_dpi_awareness();

    let module = Rc::new(FilterModule::load(hook_path)?);

    // SAFETY: registering a well-known message name has no side effects.
    let shell_recreated = unsafe { RegisterWindowMessageW(w!("TaskbarCreated")) };
    if shell_recreated == 0 {
        return Err("RegisterWindowMessageW TaskbarCreated failed".into());
    }

    let icon = tray::load_icon().ok_or("could not load tray icon")?;
    let owner = OwnerWindow::create()?;
    let menu = ContextMenu::new()?;

    let mut tray_ids = TrayIds::new();
    let tray = create_tray(owner.0, icon, &mut tray_ids);
    let hooks = install_hooks(&module);

    let controller = Controller::new(shell_recreated, config.shell_restart_policy());
    log_info!("Controller ready ({:?} on new taskbar)", controller.policy());

    HOST.with(|cell| {
        *cell.borrow_mut() = Some(HostState {
            controller,
            owner: owner.0,
            icon,
            tray_ids,
            hooks,
            tray,
            menu,
            module,
        });
    });

    taskbar::show_current_taskbar();
    let result = controller::run_loop(&mut Win32Pump::default());

    let state = HOST.with(|cell| cell.borrow_mut().take());
    drop(state);
    taskbar::show_current_taskbar();
    drop(owner);

    log_info!("Event loop ended: {result:?}");
    Ok(result)
}

fn create_tray(owner: HWND, icon: HICON, ids: &mut TrayIds) -> Option<TrayIcon> {
    let tray = TrayIcon::create(owner, icon, ids.fresh());
    match &tray {
        Some(t) => log_info!("Tray icon {} added", t.id()),
        None => log_warn!("tray icon {} could not be added", ids.current()),
    }
    tray
}

/// Re-discovers the taskbar (its handle changes whenever the shell
/// recreates it) and hooks its thread.
fn install_hooks(module: &FilterModule) -> Option<HookPair> {
    let Some(taskbar) = taskbar::find_taskbar() else {
        log_warn!("no taskbar window found; hooks not installed");
        return None;
    };

    match HookPair::install(taskbar, module) {
        Ok(pair) => {
            log_info!("Hooks installed on taskbar 0x{:X}", taskbar.0 as usize);
            Some(pair)
        }
        Err(e) => {
            log_warn!("hook install failed: {e}");
            None
        }
    }
}

/// Lifecycle effects backed by the thread-local host state.
struct Win32Lifecycle;

impl Lifecycle for Win32Lifecycle {
    fn show_menu(&mut self) {
        let handles = HOST.with(|cell| {
            cell.try_borrow()
                .ok()
                .and_then(|s| s.as_ref().map(|s| (s.menu.handle(), s.owner)))
        });
        // The borrow is released: the menu's modal loop re-enters owner_proc.
        if let Some((menu, owner)) = handles {
            menu::show_at_cursor(menu, owner);
        }
    }

    fn quit(&mut self, code: i32) {
        // SAFETY: posts WM_QUIT to this thread's queue.
        unsafe { PostQuitMessage(code) };
    }

    fn post_restart(&mut self) {
        let owner = HOST.with(|cell| {
            cell.try_borrow()
                .ok()
                .and_then(|s| s.as_ref().map(|s| s.owner))
        });
        if let Some(owner) = owner {
            // SAFETY: posting to our own window.
            let posted = unsafe { PostMessageW(Some(owner), RESTART, WPARAM(0), LPARAM(0)) };
            if let Err(e) = posted {
                log_warn!("could not post restart: {e}");
            }
        }
    }

    fn close_menu(&mut self) {
        // SAFETY: ends the menu loop running on this thread, if any.
        unsafe {
            let _ = EndMenu();
        }
    }

    fn recreate_tray(&mut self) {
        let Some((old, owner, icon, mut ids)) = with_state(|state| {
            let ids = std::mem::take(&mut state.tray_ids);
            (state.tray.take(), state.owner, state.icon, ids)
        }) else {
            return;
        };
        drop(old);

        let tray = create_tray(owner, icon, &mut ids);
        // Only misses if the host was torn down meanwhile; the new icon
        // then drops here and is removed again.
        with_state(|state| {
            state.tray_ids = ids;
            state.tray = tray;
        });
    }

    fn recreate_hooks(&mut self) {
        let Some((old, module)) =
            with_state(|state| (state.hooks.take(), Rc::clone(&state.module)))
        else {
            return;
        };
        drop(old);

        let hooks = install_hooks(&module);
        with_state(|state| state.hooks = hooks);
    }
}

/// Runs `f` on the host state under a short mutable borrow.
///
/// Callers do their OS calls outside `f`: anything that sends a message
/// to the owner window re-enters `owner_proc`, which must find the state
/// unborrowed.
fn with_state<R>(f: impl FnOnce(&mut HostState) -> R) -> Option<R> {
    HOST.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

/// WNDPROC for the owner window.
///
/// Decisions come from the [`Controller`]; messages are always passed on
/// to `DefWindowProcW` afterwards.
unsafe extern "system" fn owner_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let controller = HOST.with(|cell| {
        cell.try_borrow()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.controller))
    });
    if let Some(controller) = controller {
        controller.handle(msg, wparam.0, lparam.0, &mut Win32Lifecycle);
    }
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

/// `GetMessageW`-backed pump. Keeps the full `MSG` so dispatch can hand
/// the original to `DispatchMessageW`.
#[derive(Default)]
struct Win32Pump {
    last: MSG,
}

impl MessagePump for Win32Pump {
    fn fetch(&mut self) -> Fetched {
        // SAFETY: blocks until a message for this thread arrives.
        let status = unsafe { GetMessageW(&mut self.last, None, 0, 0) };
        match status.0 {
            0 => Fetched::Quit(self.last.wParam.0 as i32),
            -1 => Fetched::Failed,
            _ => Fetched::Message(Message {
                id: self.last.message,
                wparam: self.last.wParam.0,
                lparam: self.last.lParam.0,
            }),
        }
    }

    fn dispatch(&mut self, _msg: &Message) {
        // SAFETY: `last` is the message fetch() just retrieved.
        unsafe {
            let _ = TranslateMessage(&self.last);
            let _ = DispatchMessageW(&self.last);
        }
    }
}
