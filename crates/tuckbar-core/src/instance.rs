//! System-wide single-instance guard.
//!
//! The platform decides ownership atomically, from the outcome of creating
//! a named object, and hands the result over as a [`Claim`]. This module
//! only sequences what runs and for how long the guard is held.

use crate::controller::ExitResult;
use crate::{SetupResult, log_error, log_info};

/// Outcome of trying to create the uniquely named exclusion object.
pub enum Claim<G> {
    /// This process created the object. Dropping the guard releases it.
    Owned(G),
    /// Another process already owns it (or it could not be created).
    Taken,
}

/// Runs `body` while holding the guard, or `fallback` if the claim was lost.
///
/// The guard outlives `body` and is released only after it returns. A
/// lost claim never touches anything it does not own.
pub fn run_exclusive<G, R>(
    claim: Claim<G>,
    fallback: impl FnOnce() -> R,
    body: impl FnOnce() -> R,
) -> R {
    match claim {
        Claim::Owned(guard) => {
            let result = body();
            drop(guard);
            result
        }
        Claim::Taken => fallback(),
    }
}

/// Runs one guarded session and returns the process exit code.
///
/// A restart request calls `relaunch` only after the guard is released,
/// so the new process can claim it. Setup errors are logged and exit
/// with 0; neither they nor a lost claim ever relaunch.
pub fn run_session<G>(
    claim: Claim<G>,
    body: impl FnOnce() -> SetupResult<ExitResult>,
    relaunch: impl FnOnce(),
) -> i32 {
    let outcome = run_exclusive(
        claim,
        || {
            log_info!("Another instance is running; exiting");
            Ok(ExitResult::quit(0))
        },
        body,
    );

    match outcome {
        Ok(result) => {
            if result.restart {
                relaunch();
            }
            result.code
        }
        Err(e) => {
            log_error!("setup failed: {e}");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier, Mutex};
    use std::thread;

    /// Stand-in for the OS namespace of named objects.
    #[derive(Default)]
    struct Namespace {
        names: Mutex<HashSet<String>>,
        releases: AtomicUsize,
    }

    struct Guard {
        ns: Arc<Namespace>,
        name: String,
    }

    impl Drop for Guard {
        fn drop(&mut self) {
            self.ns.names.lock().unwrap().remove(&self.name);
            self.ns.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn claim(ns: &Arc<Namespace>, name: &str) -> Claim<Guard> {
        // Create-or-open in one step, like a named mutex.
        if ns.names.lock().unwrap().insert(name.to_string()) {
            Claim::Owned(Guard {
                ns: Arc::clone(ns),
                name: name.to_string(),
            })
        } else {
            Claim::Taken
        }
    }

    #[test]
    fn owned_claim_runs_body_and_releases_after() {
        let ns = Arc::new(Namespace::default());

        let held_during_body = run_exclusive(
            claim(&ns, "x"),
            || false,
            || ns.names.lock().unwrap().contains("x"),
        );

        assert!(held_during_body);
        assert!(ns.names.lock().unwrap().is_empty());
        assert_eq!(ns.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn taken_claim_runs_fallback_and_releases_nothing() {
        let ns = Arc::new(Namespace::default());
        let _owner = claim(&ns, "x");

        let result = run_exclusive(claim(&ns, "x"), || "fallback", || "body");

        assert_eq!(result, "fallback");
        assert!(ns.names.lock().unwrap().contains("x"));
        assert_eq!(ns.releases.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn racing_processes_run_exactly_one_body() {
        for _ in 0..50 {
            let ns = Arc::new(Namespace::default());
            let bodies = Arc::new(AtomicUsize::new(0));
            let fallbacks = Arc::new(AtomicUsize::new(0));
            let barrier = Arc::new(Barrier::new(2));
            // Keeps the winner inside its body until both have claimed.
            let claimed = Arc::new(Barrier::new(2));

            let racers: Vec<_> = (0..2)
                .map(|_| {
                    let ns = Arc::clone(&ns);
                    let bodies = Arc::clone(&bodies);
                    let fallbacks = Arc::clone(&fallbacks);
                    let barrier = Arc::clone(&barrier);
                    let claimed = Arc::clone(&claimed);
                    thread::spawn(move || {
                        barrier.wait();
                        let c = claim(&ns, "tuckbar");
                        claimed.wait();
                        run_exclusive(
                            c,
                            || {
                                fallbacks.fetch_add(1, Ordering::SeqCst);
                            },
                            || {
                                bodies.fetch_add(1, Ordering::SeqCst);
                            },
                        );
                    })
                })
                .collect();

            for r in racers {
                r.join().unwrap();
            }

            assert_eq!(bodies.load(Ordering::SeqCst), 1);
            assert_eq!(fallbacks.load(Ordering::SeqCst), 1);
            assert_eq!(ns.releases.load(Ordering::SeqCst), 1);
        }
    }

    // -- run_session --

    #[test]
    fn restart_relaunches_once_after_release() {
        // Arrange
        let ns = Arc::new(Namespace::default());
        let launches = RefCell::new(Vec::new());

        // Act
        let code = run_session(
            claim(&ns, "x"),
            || Ok(ExitResult::restart()),
            || launches.borrow_mut().push(ns.names.lock().unwrap().contains("x")),
        );

        // Assert: one launch, and the name was already free when it ran.
        assert_eq!(code, 0);
        assert_eq!(*launches.borrow(), vec![false]);
        assert_eq!(ns.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn quit_does_not_relaunch() {
        // Arrange
        let ns = Arc::new(Namespace::default());
        let launches = RefCell::new(0);

        // Act
        let code = run_session(
            claim(&ns, "x"),
            || Ok(ExitResult::quit(3)),
            || *launches.borrow_mut() += 1,
        );

        // Assert
        assert_eq!(code, 3);
        assert_eq!(*launches.borrow(), 0);
    }

    #[test]
    fn setup_error_exits_zero_without_relaunch() {
        // Arrange
        let ns = Arc::new(Namespace::default());
        let launches = RefCell::new(0);

        // Act
        let code = run_session(
            claim(&ns, "x"),
            || Err("filter module missing".into()),
            || *launches.borrow_mut() += 1,
        );

        // Assert
        assert_eq!(code, 0);
        assert_eq!(*launches.borrow(), 0);
        assert_eq!(ns.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lost_claim_exits_zero_without_running_or_relaunching() {
        // Arrange
        let ns = Arc::new(Namespace::default());
        let _owner = claim(&ns, "x");
        let launches = RefCell::new(0);

        // Act
        let code = run_session(
            claim(&ns, "x"),
            || Ok(ExitResult::restart()),
            || *launches.borrow_mut() += 1,
        );

        // Assert
        assert_eq!(code, 0);
        assert_eq!(*launches.borrow(), 0);
        assert_eq!(ns.releases.load(Ordering::SeqCst), 0);
    }
}
