pub mod capability;
pub mod config;
pub mod controller;
pub mod filter;
pub mod instance;
pub mod lazy;
pub mod log;
pub mod rect;
pub mod tray;
pub mod visibility;

pub use controller::{Controller, ExitResult, ShellRestartPolicy};
pub use filter::ProcessState;
pub use lazy::LazyState;
pub use rect::Rect;

/// A boxed error for setup steps that end the process instance.
///
/// Setup failures are terminal and only ever reported, never matched on,
/// so a boxed trait object is all callers need.
pub type SetupResult<T> = Result<T, Box<dyn std::error::Error>>;
