//! Condition variables: blocking until another thread changes a predicate.
//!
//! A [`Condvar`] is associated with a [`Mutex`](crate::Mutex) one wait at a
//! time. The association is per call, not a standing relationship, but the
//! platform requires the *same* mutex on every wait that execution depends
//! on. Waits can return spuriously, so the predicate governs the loop:
//!
//! ```no_run
//! use std::cell::UnsafeCell;
//! use osthread::{Condvar, Mutex};
//!
//! struct Ready {
//!     lock: Mutex,
//!     changed: Condvar,
//!     flag: UnsafeCell<bool>,
//! }
//! // SAFETY: `flag` is only touched while `lock` is held.
//! unsafe impl Sync for Ready {}
//!
//! fn wait_until_ready(ready: &Ready) {
//!     let mut guard = ready.lock.lock();
//!     while unsafe { !*ready.flag.get() } {
//!         ready.changed.wait(&mut guard);
//!     }
//! }
//! ```

use core::cell::UnsafeCell;
use core::mem;

use crate::mutex::LockGuard;
use osthread_sys as sys;

/// A native condition variable.
///
/// Like [`Mutex`](crate::Mutex), the native primitive lives in a heap box
/// so its address never changes while the wrapper stays movable.
pub struct Condvar {
    native: Box<UnsafeCell<sys::RawCond>>,
}

// SAFETY: the native condition variable is built for concurrent use from
// any thread; all access goes through the raw pointer handed to the OS.
unsafe impl Send for Condvar {}
unsafe impl Sync for Condvar {}

impl Condvar {
    /// Creates a new condition variable with no waiters.
    pub fn new() -> Condvar {
        // SAFETY: all-zero storage is valid input for cond_init, which
        // overwrites it with an initialized condition variable.
        let native: Box<UnsafeCell<sys::RawCond>> =
            Box::new(UnsafeCell::new(unsafe { mem::zeroed() }));
        // SAFETY: freshly allocated, uninitialized storage.
        unsafe { sys::cond_init(native.get()) };
        Condvar { native }
    }

    /// Atomically releases the mutex held through `guard` and suspends the
    /// calling thread; the mutex is held again when this returns.
    ///
    /// Requiring the guard proves at compile time that the caller holds the
    /// mutex. The return may be spurious; callers re-check their predicate
    /// in a loop (see the module docs).
    pub fn wait(&self, guard: &mut LockGuard<'_>) {
        // SAFETY: `guard` witnesses that the calling thread holds the
        // mutex, which is the native wait's precondition.
        unsafe { sys::cond_wait(self.native.get(), guard.mutex_ptr()) };
    }

    /// Wakes at most one waiting thread. Which one is unspecified when
    /// several wait; no fairness or ordering is promised. Never blocks.
    pub fn signal(&self) {
        // SAFETY: the condition variable is initialized while self exists.
        unsafe { sys::cond_signal(self.native.get()) };
    }

    /// Wakes every thread currently waiting. Never blocks; threads that
    /// start waiting afterwards are unaffected.
    pub fn broadcast(&self) {
        // SAFETY: the condition variable is initialized while self exists.
        unsafe { sys::cond_broadcast(self.native.get()) };
    }

    /// Raw pointer to the native condition variable, valid for the life of
    /// this `Condvar`.
    #[inline]
    pub fn native_handle(&self) -> *mut sys::RawCond {
        self.native.get()
    }
}

impl Default for Condvar {
    fn default() -> Condvar {
        Condvar::new()
    }
}

impl Drop for Condvar {
    fn drop(&mut self) {
        // Contract: no thread is blocked in wait at this point.
        unsafe { sys::cond_destroy(self.native.get()) };
    }
}
