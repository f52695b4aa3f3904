//! All-or-nothing resolution of named entry points.

use std::fmt;

/// Exported name of the post-dispatch filter (`WH_CALLWNDPROCRET`).
pub const SYNC_FILTER: &str = "tuckbar_filter_sync_messages";

/// Exported name of the queued-message filter (`WH_GETMESSAGE`).
pub const ASYNC_FILTER: &str = "tuckbar_filter_async_messages";

/// Every entry point the host needs from the filter module.
pub const FILTER_ENTRY_POINTS: [&str; 2] = [SYNC_FILTER, ASYNC_FILTER];

/// A required entry point was not exported by the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingCapability(pub &'static str);

impl fmt::Display for MissingCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "filter module does not export {}", self.0)
    }
}

impl std::error::Error for MissingCapability {}

/// Looks up every name, failing on the first one that is absent.
///
/// Nothing is returned unless all lookups succeed, so a partially
/// resolved table can never reach the hook installer.
pub fn resolve_all<T, const N: usize>(
    names: [&'static str; N],
    mut lookup: impl FnMut(&'static str) -> Option<T>,
) -> Result<[T; N], MissingCapability> {
    let mut found = Vec::with_capacity(N);
    for name in names {
        found.push(lookup(name).ok_or(MissingCapability(name))?);
    }
    // Exactly N entries were pushed above.
    found
        .try_into()
        .map_err(|_| MissingCapability(names.first().copied().unwrap_or("")))
}
