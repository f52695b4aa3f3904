mod loader;

use serde::{Deserialize, Serialize};

use crate::controller::ShellRestartPolicy;
use crate::log::LogConfig;

pub use loader::{config_dir, config_path, load, try_load};

/// Top-level configuration for Tuckbar.
///
/// Read from `~/.config/tuckbar/config.toml` if it exists. The file is
/// never written. Missing sections fall back to defaults thanks to
/// `#[serde(default)]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reaction to the shell recreating its taskbar.
    pub shell: ShellConfig,
    /// File logging settings.
    pub logging: LogConfig,
}

/// Shell lifecycle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Relaunch the whole process when the shell announces a new taskbar.
    /// When `false`, the tray icon and hooks are rebuilt in place instead.
    pub restart_on_new_taskbar: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            restart_on_new_taskbar: true,
        }
    }
}

impl Config {
    pub fn shell_restart_policy(&self) -> ShellRestartPolicy {
        ShellRestartPolicy::from_flag(self.shell.restart_on_new_taskbar)
    }

    /// Clamps values to safe ranges.
    pub fn validate(&mut self) {
        self.logging.max_file_mb = self.logging.max_file_mb.clamp(1, 1024);
    }
}
