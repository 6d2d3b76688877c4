//! Open file limit.
//!
//! Recursive watchers hold one descriptor per directory on some platforms,
//! so large trees exhaust the default soft limit quickly.

/// Soft limit requested at startup.
pub const OPEN_FILE_LIMIT: u64 = 10_000;

/// Raise the open-file limit. Failures are logged, never fatal.
#[cfg(unix)]
pub fn raise_open_file_limit(target: u64) {
    use nix::sys::resource::{Resource, getrlimit, setrlimit};

    let (soft, hard) = match getrlimit(Resource::RLIMIT_NOFILE) {
        Ok(limits) => limits,
        Err(e) => {
            crate::log!("main"; "failed to read open file limit: {}", e);
            return;
        }
    };

    let wanted = clamp_limit(target, soft, hard);
    if wanted == soft {
        return;
    }

    match setrlimit(Resource::RLIMIT_NOFILE, wanted, hard) {
        Ok(()) => crate::debug!("main"; "open file limit {} -> {}", soft, wanted),
        Err(e) => crate::log!("main"; "failed to raise open file limit: {}", e),
    }
}

#[cfg(not(unix))]
pub fn raise_open_file_limit(_target: u64) {}

/// Never lower the current soft limit and never exceed the hard limit.
#[cfg_attr(not(unix), allow(dead_code))]
fn clamp_limit(target: u64, soft: u64, hard: u64) -> u64 {
    target.max(soft).min(hard)
}
