//! POSIX backend over the `libc` crate.

use core::ffi::{c_int, c_void};
use core::mem;
use core::ptr;

use crate::{StartPacket, ThreadEntry};

/// Native thread identifier.
pub type RawThread = libc::pthread_t;
/// Native mutual-exclusion primitive.
pub type RawMutex = libc::pthread_mutex_t;
/// Native condition variable.
pub type RawCond = libc::pthread_cond_t;

/// Adapter with the signature `pthread_create` requires. Sole consumer of
/// the start packet leaked by [`thread_create`].
extern "C" fn thread_start(packet: *mut c_void) -> *mut c_void {
    // SAFETY: `packet` is the Box leaked by `thread_create`, reclaimed
    // exactly once, here.
    let packet = unsafe { Box::from_raw(packet.cast::<StartPacket>()) };
    // SAFETY: `thread_create`'s contract keeps `arg` valid until the entry
    // has run.
    unsafe { (packet.entry)(packet.arg) };
    ptr::null_mut()
}

/// Starts a native thread running `entry(arg)`.
///
/// Returns 0 and writes the new identifier to `thread` on success. On
/// failure returns the OS error code; no thread was started and `arg`
/// remains owned by the caller.
///
/// # Safety
///
/// `thread` must point to writable storage for a [`RawThread`]. `arg` must
/// stay valid until `entry` has run, or until the caller reclaims it after
/// a failed create.
pub unsafe fn thread_create(thread: *mut RawThread, entry: ThreadEntry, arg: *mut c_void) -> c_int {
    let packet = Box::into_raw(Box::new(StartPacket { entry, arg }));
    let rc = libc::pthread_create(thread, ptr::null(), thread_start, packet.cast::<c_void>());
    if rc != 0 {
        // The thread never existed, so the packet is reclaimed here.
        drop(Box::from_raw(packet));
    }
    rc
}

/// Blocks until `thread` terminates and releases its identifier.
///
/// # Safety
///
/// `thread` must identify a live thread that has not been joined or
/// detached; each identifier is joined at most once.
pub unsafe fn thread_join(thread: RawThread) {
    libc::pthread_join(thread, ptr::null_mut());
}

/// Releases `thread` to run independently; the OS reclaims its resources
/// when it terminates.
///
/// # Safety
///
/// Same identifier rules as [`thread_join`].
pub unsafe fn thread_detach(thread: RawThread) {
    libc::pthread_detach(thread);
}

/// Suspends the calling thread for at least `ms` milliseconds.
///
/// Restarted on `EINTR` with the unslept remainder, so the call may return
/// late but never early.
pub fn thread_sleep(ms: u64) {
    // SAFETY: all-zero is a valid timespec.
    let mut ts: libc::timespec = unsafe { mem::zeroed() };
    ts.tv_sec = (ms / 1000) as libc::time_t;
    ts.tv_nsec = ((ms % 1000) * 1_000_000) as libc::c_long;
    loop {
        // SAFETY: all-zero is a valid timespec.
        let mut rem: libc::timespec = unsafe { mem::zeroed() };
        // SAFETY: both pointers reference live stack storage.
        let rc = unsafe { libc::nanosleep(&ts, &mut rem) };
        if rc == 0 || std::io::Error::last_os_error().raw_os_error() != Some(libc::EINTR) {
            return;
        }
        ts = rem;
    }
}

/// Initializes the lock at `m` with default (non-recursive) attributes.
///
/// # Safety
///
/// `m` must point to writable storage that is not already initialized.
pub unsafe fn mutex_init(m: *mut RawMutex) {
    libc::pthread_mutex_init(m, ptr::null());
}

/// Blocks until the calling thread owns the lock. Relocking a lock the
/// calling thread already holds is undefined.
///
/// # Safety
///
/// `m` must point to an initialized lock.
pub unsafe fn mutex_lock(m: *mut RawMutex) {
    libc::pthread_mutex_lock(m);
}

/// Releases a lock held by the calling thread.
///
/// # Safety
///
/// `m` must point to an initialized lock held by the calling thread.
pub unsafe fn mutex_unlock(m: *mut RawMutex) {
    libc::pthread_mutex_unlock(m);
}

/// Destroys the lock at `m`.
///
/// # Safety
///
/// `m` must point to an initialized lock that no thread holds or waits on.
pub unsafe fn mutex_destroy(m: *mut RawMutex) {
    libc::pthread_mutex_destroy(m);
}

/// Initializes the condition variable at `c`.
///
/// # Safety
///
/// `c` must point to writable storage that is not already initialized.
pub unsafe fn cond_init(c: *mut RawCond) {
    libc::pthread_cond_init(c, ptr::null());
}

/// Atomically releases `m` and suspends the calling thread; re-acquires `m`
/// before returning. May wake spuriously.
///
/// # Safety
///
/// `c` and `m` must be initialized and `m` must be held by the calling
/// thread.
pub unsafe fn cond_wait(c: *mut RawCond, m: *mut RawMutex) {
    libc::pthread_cond_wait(c, m);
}

/// Wakes at most one waiter. Never blocks.
///
/// # Safety
///
/// `c` must point to an initialized condition variable.
pub unsafe fn cond_signal(c: *mut RawCond) {
    libc::pthread_cond_signal(c);
}

/// Wakes every current waiter. Never blocks.
///
/// # Safety
///
/// `c` must point to an initialized condition variable.
pub unsafe fn cond_broadcast(c: *mut RawCond) {
    libc::pthread_cond_broadcast(c);
}

/// Destroys the condition variable at `c`.
///
/// # Safety
///
/// `c` must point to an initialized condition variable with no waiters.
pub unsafe fn cond_destroy(c: *mut RawCond) {
    libc::pthread_cond_destroy(c);
}
