//! Raw bindings to the host operating system's threading primitives.
//!
//! Every operation exists exactly once at this level and is implemented
//! twice, by a POSIX backend (`pthread_*`, `nanosleep`) and a Win32 backend
//! (`CreateThread`, `CRITICAL_SECTION`, `CONDITION_VARIABLE`). The backend
//! is selected when the crate is compiled, never at runtime.
//!
//! | Operation                 | POSIX                    | Win32                       |
//! |---------------------------|--------------------------|-----------------------------|
//! | `thread_create`           | `pthread_create`         | `CreateThread`              |
//! | `thread_join`             | `pthread_join`           | `WaitForSingleObject`       |
//! | `thread_detach`           | `pthread_detach`         | `CloseHandle`               |
//! | `thread_sleep`            | `nanosleep`              | `Sleep`                     |
//! | `mutex_*`                 | `pthread_mutex_*`        | `*CriticalSection`          |
//! | `cond_*`                  | `pthread_cond_*`         | `*ConditionVariable*`       |
//!
//! Blocking semantics: `thread_join`, `mutex_lock`, and `cond_wait` may
//! block indefinitely; `cond_signal`, `cond_broadcast`, `mutex_unlock`, and
//! `thread_detach` never block; `thread_create` returns as soon as the OS
//! scheduler has accepted the new thread, not when it starts running.
//!
//! Destroying a mutex or condition variable while any thread is blocked on
//! it is undefined; callers guarantee there are no concurrent waiters.

use core::ffi::c_void;

/// Entry signature shared by both backends.
///
/// Each backend adapts this to its native thread-start signature through a
/// small heap-allocated start packet that the backend frees itself.
pub type ThreadEntry = unsafe extern "C" fn(*mut c_void);

/// Pairs a fixed-signature entry with its opaque argument for the trip
/// through the native start call.
pub(crate) struct StartPacket {
    pub(crate) entry: ThreadEntry,
    pub(crate) arg: *mut c_void,
}

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::*;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::*;
