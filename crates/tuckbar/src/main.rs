#![cfg_attr(windows, windows_subsystem = "windows")]

use clap::Parser;
use clap::error::ErrorKind;

#[derive(Parser)]
#[command(
    name = "tuckbar",
    version,
    about = "Keeps the Windows taskbar tucked away until you switch to it"
)]
struct Cli {}

fn main() {
    // Only --help and --version are answered; any other argument is
    // ignored rather than rejected, since there is no console to report to.
    if let Err(e) = Cli::try_parse()
        && matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
    {
        e.exit();
    }

    #[cfg(windows)]
    std::process::exit(tuckbar_windows::app::run());

    #[cfg(not(windows))]
    {
        eprintln!("tuckbar only runs on Windows");
        std::process::exit(1);
    }
}
