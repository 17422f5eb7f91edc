//! Spawn-time error reporting.
//!
//! Creating a thread is the only operation in this crate that can fail
//! recoverably. Everything else either cannot fail (unlock, signal) or is a
//! contract violation handled by aborting (dropping a joinable handle).

use thiserror::Error;

/// Error returned when the operating system cannot start a new thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The OS could not allocate scheduling resources for another thread.
    ///
    /// Carries the raw OS error code: an `EAGAIN`-family errno on POSIX, a
    /// `GetLastError` value on Windows. The closure passed to
    /// [`spawn`](crate::spawn) has already been freed when this is returned.
    #[error("the operating system could not start a new thread (os error {0})")]
    ResourceExhausted(i32),
}

impl SpawnError {
    /// Raw OS error code carried by this error.
    #[inline]
    pub fn os_code(self) -> i32 {
        match self {
            SpawnError::ResourceExhausted(code) => code,
        }
    }
}
