use super::*;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

const SHELL_RECREATED: u32 = 0xC123;

type Queue = Rc<RefCell<VecDeque<Fetched>>>;

#[derive(Default)]
struct FakeLifecycle {
    queue: Queue,
    menus: usize,
    menus_closed: usize,
    quits: Vec<i32>,
    restarts_posted: usize,
    trays_recreated: usize,
    hooks_recreated: usize,
}

impl Lifecycle for FakeLifecycle {
    fn show_menu(&mut self) {
        self.menus += 1;
    }

    fn quit(&mut self, code: i32) {
        self.quits.push(code);
        self.queue.borrow_mut().push_back(Fetched::Quit(code));
    }

    fn post_restart(&mut self) {
        self.restarts_posted += 1;
        self.queue.borrow_mut().push_back(msg(RESTART, 0, 0));
    }

    fn close_menu(&mut self) {
        self.menus_closed += 1;
    }

    fn recreate_tray(&mut self) {
        self.trays_recreated += 1;
    }

    fn recreate_hooks(&mut self) {
        self.hooks_recreated += 1;
    }
}

/// Feeds queued messages to a controller, like a window procedure would.
struct FakePump {
    queue: Queue,
    controller: Controller,
    lifecycle: FakeLifecycle,
    dispatched: Vec<u32>,
}

impl FakePump {
    fn new(policy: ShellRestartPolicy, messages: &[Fetched]) -> Self {
        let queue: Queue = Rc::new(RefCell::new(messages.iter().copied().collect()));
        Self {
            lifecycle: FakeLifecycle {
                queue: Rc::clone(&queue),
                ..Default::default()
            },
            queue,
            controller: Controller::new(SHELL_RECREATED, policy),
            dispatched: Vec::new(),
        }
    }
}

impl MessagePump for FakePump {
    fn fetch(&mut self) -> Fetched {
        // An empty queue would block forever on a real pump.
        self.queue.borrow_mut().pop_front().unwrap_or(Fetched::Failed)
    }

    fn dispatch(&mut self, m: &Message) {
        self.dispatched.push(m.id);
        self.controller
            .handle(m.id, m.wparam, m.lparam, &mut self.lifecycle);
    }
}

fn msg(id: u32, wparam: usize, lparam: isize) -> Fetched {
    Fetched::Message(Message { id, wparam, lparam })
}

// -- react --

#[test]
fn right_click_on_tray_shows_menu() {
    let c = Controller::new(SHELL_RECREATED, ShellRestartPolicy::Restart);

    // Version-3 tray callbacks carry the event in the low word of lParam.
    let lparam = (0x0001_0000 | WM_RBUTTONUP) as isize;
    assert_eq!(c.react(TRAY_CALLBACK, 0, lparam), Reaction::ShowMenu);
    assert_eq!(
        c.react(TRAY_CALLBACK, 0, NIN_KEYSELECT as isize),
        Reaction::ShowMenu
    );
}

#[test]
fn other_tray_events_are_ignored() {
    let c = Controller::new(SHELL_RECREATED, ShellRestartPolicy::Restart);

    // WM_LBUTTONUP
    assert_eq!(c.react(TRAY_CALLBACK, 0, 0x0202), Reaction::None);
}

#[test]
fn exit_command_quits() {
    let c = Controller::new(SHELL_RECREATED, ShellRestartPolicy::Restart);

    assert_eq!(c.react(WM_COMMAND, MENU_EXIT as usize, 0), Reaction::Quit);
    assert_eq!(c.react(WM_COMMAND, 5, 0), Reaction::None);
}

#[test]
fn shell_recreated_follows_policy() {
    let restart = Controller::new(SHELL_RECREATED, ShellRestartPolicy::Restart);
    let recreate = Controller::new(SHELL_RECREATED, ShellRestartPolicy::Recreate);

    assert_eq!(restart.react(SHELL_RECREATED, 0, 0), Reaction::PostRestart);
    assert_eq!(recreate.react(SHELL_RECREATED, 0, 0), Reaction::Recreate);
}

#[test]
fn restart_reaching_the_window_procedure_is_resumed() {
    let c = Controller::new(SHELL_RECREATED, ShellRestartPolicy::Restart);

    assert_eq!(c.react(RESTART, 0, 0), Reaction::ResumeRestart);
}

#[test]
fn unregistered_broadcast_id_never_matches() {
    let c = Controller::new(0, ShellRestartPolicy::Restart);

    assert_eq!(c.react(0, 0, 0), Reaction::None);
}

#[test]
fn policy_flag_maps_to_policy() {
    assert_eq!(ShellRestartPolicy::from_flag(true), ShellRestartPolicy::Restart);
    assert_eq!(
        ShellRestartPolicy::from_flag(false),
        ShellRestartPolicy::Recreate
    );
}

// -- run_loop --

#[test]
fn quit_message_ends_loop_with_its_code() {
    let mut pump = FakePump::new(
        ShellRestartPolicy::Restart,
        &[msg(0x000F, 0, 0), Fetched::Quit(3)],
    );

    assert_eq!(run_loop(&mut pump), ExitResult::quit(3));
    assert_eq!(pump.dispatched, vec![0x000F]);
}

#[test]
fn pump_failure_ends_loop_without_restart() {
    let mut pump = FakePump::new(ShellRestartPolicy::Restart, &[Fetched::Failed]);

    assert_eq!(run_loop(&mut pump), ExitResult::quit(0));
}

#[test]
fn shell_recreated_broadcast_restarts_exactly_once() {
    let mut pump = FakePump::new(
        ShellRestartPolicy::Restart,
        &[msg(SHELL_RECREATED, 0, 0)],
    );

    let result = run_loop(&mut pump);

    assert_eq!(result, ExitResult { code: 0, restart: true });
    assert_eq!(pump.lifecycle.restarts_posted, 1);
    assert!(pump.queue.borrow().is_empty());
    assert_eq!(pump.lifecycle.trays_recreated, 0);
    assert_eq!(pump.lifecycle.hooks_recreated, 0);
    assert_eq!(pump.dispatched, vec![SHELL_RECREATED]);
}

#[test]
fn recreate_policy_rebuilds_in_place_and_keeps_running() {
    let mut pump = FakePump::new(
        ShellRestartPolicy::Recreate,
        &[msg(SHELL_RECREATED, 0, 0), msg(WM_COMMAND, 0, 0)],
    );

    let result = run_loop(&mut pump);

    assert_eq!(result, ExitResult::quit(0));
    assert_eq!(pump.lifecycle.restarts_posted, 0);
    assert_eq!(pump.lifecycle.trays_recreated, 1);
    assert_eq!(pump.lifecycle.hooks_recreated, 1);
    assert_eq!(pump.lifecycle.quits, vec![0]);
}

#[test]
fn menu_exit_quits_through_the_loop() {
    let mut pump = FakePump::new(
        ShellRestartPolicy::Restart,
        &[msg(TRAY_CALLBACK, 0, WM_RBUTTONUP as isize), msg(WM_COMMAND, 0, 0)],
    );

    let result = run_loop(&mut pump);

    assert_eq!(result, ExitResult::quit(0));
    assert_eq!(pump.lifecycle.menus, 1);
}

#[test]
fn restart_pulled_by_the_menu_loop_still_ends_the_loop() {
    // Arrange: the menu's modal loop dispatches the posted restart to the
    // window procedure instead of leaving it for run_loop.
    let controller = Controller::new(SHELL_RECREATED, ShellRestartPolicy::Restart);
    let queue = Queue::default();
    let mut lifecycle = FakeLifecycle {
        queue: Rc::clone(&queue),
        ..Default::default()
    };

    // Act
    let reaction = controller.handle(RESTART, 0, 0, &mut lifecycle);
    let mut pump = FakePump {
        queue,
        controller,
        lifecycle,
        dispatched: Vec::new(),
    };
    let result = run_loop(&mut pump);

    // Assert
    assert_eq!(reaction, Reaction::ResumeRestart);
    assert_eq!(pump.lifecycle.menus_closed, 1);
    assert_eq!(pump.lifecycle.restarts_posted, 1);
    assert_eq!(result, ExitResult::restart());
    assert!(pump.dispatched.is_empty());
}
