use tuckbar_core::instance::Claim;
use windows::Win32::Foundation::{CloseHandle, ERROR_ALREADY_EXISTS, GetLastError, HANDLE};
use windows::Win32::System::Threading::CreateMutexW;
use windows::core::HSTRING;

/// Name of the system-wide object that marks a running instance.
pub const INSTANCE_MUTEX: &str = "tuckbar-single-process-5d0a3f52-8c1e-4f7b-9a61-2b7e04c9d3aa";

/// Ownership of the named mutex; closing it on drop ends the claim.
pub struct InstanceGuard(HANDLE);

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        // SAFETY: we created this handle.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Tries to create the named mutex.
///
/// Ownership is decided by the creation outcome itself: if the object
/// already existed, `CreateMutexW` still succeeds but reports
/// `ERROR_ALREADY_EXISTS`. There is no separate existence check to race.
pub fn claim(name: &str) -> Claim<InstanceGuard> {
    let wide = HSTRING::from(name);

    // SAFETY: default security, not initially owned, named object.
    let handle = match unsafe { CreateMutexW(None, false, &wide) } {
        Ok(handle) => handle,
        Err(_) => return Claim::Taken,
    };

    // SAFETY: read immediately after the call that set it.
    if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
        // Only our reference to someone else's object is closed here.
        unsafe {
            let _ = CloseHandle(handle);
        }
        return Claim::Taken;
    }

    Claim::Owned(InstanceGuard(handle))
}
