//! Process entry: configuration, logging, single-instance gate and the
//! relaunch that follows a restart request.

use tuckbar_core::instance::run_session;
use tuckbar_core::{config, log, log_error, log_info};

use crate::{debug, host, instance, process};

/// Runs Tuckbar and returns the process exit code.
///
/// Setup failures are logged and still exit with 0: a missing filter
/// module or taskbar is not something the caller can act on.
pub fn run() -> i32 {
    log::set_debug_sink(debug::output_debug_line);
    let config = config::load();
    log::init(&config.logging);

    let exe = match process::exe_path() {
        Ok(exe) => exe,
        Err(e) => {
            log_error!("could not locate executable: {e}");
            return 0;
        }
    };

    run_session(
        instance::claim(instance::INSTANCE_MUTEX),
        || {
            let hook = process::hook_path(&exe)?;
            log_info!("Starting with filter module {}", hook.display());
            host::run(&config, &hook)
        },
        || process::relaunch(&exe),
    )
}
