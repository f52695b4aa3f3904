use windows::Win32::System::Diagnostics::Debug::OutputDebugStringW;
use windows::core::HSTRING;

/// Writes one line to the debugger output channel.
///
/// Installed as the logger's debug sink, so warnings and errors are
/// visible in a debug viewer even when file logging is off.
pub fn output_debug_line(line: &str) {
    let text = HSTRING::from(format!("tuckbar: {line}\n"));
    // SAFETY: HSTRING is NUL-terminated and outlives the call.
    unsafe { OutputDebugStringW(&text) };
}
