//! Win32 backend over the `windows-sys` crate.

use core::ffi::{c_int, c_void};
use core::ptr;

use windows_sys::Win32::Foundation::{CloseHandle, GetLastError, HANDLE};
use windows_sys::Win32::System::Threading::{
    CreateThread, DeleteCriticalSection, EnterCriticalSection, InitializeConditionVariable,
    InitializeCriticalSection, LeaveCriticalSection, Sleep, SleepConditionVariableCS,
    WaitForSingleObject, WakeAllConditionVariable, WakeConditionVariable, CONDITION_VARIABLE,
    CRITICAL_SECTION, INFINITE,
};

use crate::{StartPacket, ThreadEntry};

/// Native thread identifier.
pub type RawThread = HANDLE;
/// Native mutual-exclusion primitive.
pub type RawMutex = CRITICAL_SECTION;
/// Native condition variable.
pub type RawCond = CONDITION_VARIABLE;

/// Adapter with the signature `CreateThread` requires. Sole consumer of the
/// start packet leaked by [`thread_create`].
unsafe extern "system" fn thread_start(packet: *mut c_void) -> u32 {
    let packet = Box::from_raw(packet.cast::<StartPacket>());
    (packet.entry)(packet.arg);
    0
}

/// Starts a native thread running `entry(arg)`.
///
/// Returns 0 and writes the new handle to `thread` on success. On failure
/// returns the `GetLastError` code; no thread was started and `arg` remains
/// owned by the caller.
///
/// # Safety
///
/// `thread` must point to writable storage for a [`RawThread`]. `arg` must
/// stay valid until `entry` has run, or until the caller reclaims it after
/// a failed create.
pub unsafe fn thread_create(thread: *mut RawThread, entry: ThreadEntry, arg: *mut c_void) -> c_int {
    let packet = Box::into_raw(Box::new(StartPacket { entry, arg }));
    let handle = CreateThread(
        ptr::null(),
        0,
        Some(thread_start),
        packet.cast::<c_void>(),
        0,
        ptr::null_mut(),
    );
    if handle.is_null() {
        // The thread never existed, so the packet is reclaimed here.
        drop(Box::from_raw(packet));
        return GetLastError() as c_int;
    }
    *thread = handle;
    0
}

/// Blocks until `thread` terminates, then closes the handle.
///
/// # Safety
///
/// `thread` must be a live handle from [`thread_create`] that has not been
/// joined or detached; each handle is joined at most once.
pub unsafe fn thread_join(thread: RawThread) {
    WaitForSingleObject(thread, INFINITE);
    CloseHandle(thread);
}

/// Closes the handle without waiting; the OS reclaims the thread's
/// resources when it terminates.
///
/// # Safety
///
/// Same handle rules as [`thread_join`].
pub unsafe fn thread_detach(thread: RawThread) {
    CloseHandle(thread);
}

/// Suspends the calling thread for at least `ms` milliseconds.
pub fn thread_sleep(ms: u64) {
    let mut left = ms;
    loop {
        // INFINITE is u32::MAX, so stay strictly below it per call.
        let chunk = left.min(u64::from(u32::MAX - 1)) as u32;
        // SAFETY: Sleep has no memory preconditions.
        unsafe { Sleep(chunk) };
        left -= u64::from(chunk);
        if left == 0 {
            return;
        }
    }
}

/// Initializes the lock at `m`.
///
/// # Safety
///
/// `m` must point to writable storage that is not already initialized.
pub unsafe fn mutex_init(m: *mut RawMutex) {
    InitializeCriticalSection(m);
}

/// Blocks until the calling thread owns the lock. Relocking a lock the
/// calling thread already holds is undefined for callers of this facade.
///
/// # Safety
///
/// `m` must point to an initialized lock.
pub unsafe fn mutex_lock(m: *mut RawMutex) {
    EnterCriticalSection(m);
}

/// Releases a lock held by the calling thread.
///
/// # Safety
///
/// `m` must point to an initialized lock held by the calling thread.
pub unsafe fn mutex_unlock(m: *mut RawMutex) {
    LeaveCriticalSection(m);
}

/// Destroys the lock at `m`.
///
/// # Safety
///
/// `m` must point to an initialized lock that no thread holds or waits on.
pub unsafe fn mutex_destroy(m: *mut RawMutex) {
    DeleteCriticalSection(m);
}

/// Initializes the condition variable at `c`.
///
/// # Safety
///
/// `c` must point to writable storage that is not already initialized.
pub unsafe fn cond_init(c: *mut RawCond) {
    InitializeConditionVariable(c);
}

/// Atomically releases `m` and suspends the calling thread; re-acquires `m`
/// before returning. May wake spuriously.
///
/// # Safety
///
/// `c` and `m` must be initialized and `m` must be held by the calling
/// thread.
pub unsafe fn cond_wait(c: *mut RawCond, m: *mut RawMutex) {
    SleepConditionVariableCS(c, m, INFINITE);
}

/// Wakes at most one waiter. Never blocks.
///
/// # Safety
///
/// `c` must point to an initialized condition variable.
pub unsafe fn cond_signal(c: *mut RawCond) {
    WakeConditionVariable(c);
}

/// Wakes every current waiter. Never blocks.
///
/// # Safety
///
/// `c` must point to an initialized condition variable.
pub unsafe fn cond_broadcast(c: *mut RawCond) {
    WakeAllConditionVariable(c);
}

/// Win32 condition variables need no teardown.
///
/// # Safety
///
/// `c` must point to an initialized condition variable with no waiters.
pub unsafe fn cond_destroy(c: *mut RawCond) {
    let _ = c;
}
