//! Lock-free, non-blocking one-time initialization.
//!
//! [`LazyState`] is built for code that runs inside someone else's
//! message pump: callers never wait for each other. Exactly one caller
//! wins the right to construct the value; everyone who arrives while
//! construction is in flight gets `None` and must treat its own call as
//! a no-op.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU8, Ordering};

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;

/// A cell that is written once and read many times without locking.
///
/// State transitions are `Uninitialized -> Initializing -> Ready`. The
/// first transition is a single compare-and-swap; the value is published
/// with a release store and read back with acquire loads.
pub struct LazyState<T> {
    status: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

// SAFETY: the value is written exactly once, by the thread that won the
// CAS, before the release store of READY. Readers only touch it after an
// acquire load that observed READY, so shared access never races a write.
unsafe impl<T: Send + Sync> Sync for LazyState<T> {}
unsafe impl<T: Send> Send for LazyState<T> {}

impl<T> LazyState<T> {
    /// Creates an empty cell. Usable in `static` items.
    pub const fn new() -> Self {
        Self {
            status: AtomicU8::new(UNINITIALIZED),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Returns the published value, constructing it on the first call.
    ///
    /// Never blocks, spins, or retries. Returns `None` when another
    /// caller is constructing the value right now, including callers that
    /// simply lost the race to start construction. The caller that runs
    /// `init` receives the value it just published.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> Option<&T> {
        match self.status.load(Ordering::Acquire) {
            READY => return Some(self.ready()),
            INITIALIZING => return None,
            _ => {}
        }

        if self
            .status
            .compare_exchange(
                UNINITIALIZED,
                INITIALIZING,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .is_err()
        {
            return None;
        }

        // SAFETY: winning the CAS grants exclusive write access until the
        // READY store below; no reader dereferences the slot before then.
        unsafe { (*self.value.get()).write(init()) };
        self.status.store(READY, Ordering::Release);

        Some(self.ready())
    }

    /// Returns the value if construction has finished.
    pub fn get(&self) -> Option<&T> {
        (self.status.load(Ordering::Acquire) == READY).then(|| self.ready())
    }

    fn ready(&self) -> &T {
        // SAFETY: only called after observing READY with acquire ordering
        // (or by the initializing thread after its own release store).
        unsafe { (*self.value.get()).assume_init_ref() }
    }
}

impl<T> Default for LazyState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for LazyState<T> {
    fn drop(&mut self) {
        if *self.status.get_mut() == READY {
            // SAFETY: READY means the slot holds an initialized value and
            // `&mut self` rules out outstanding borrows.
            unsafe { self.value.get_mut().assume_init_drop() };
        }
    }
}
