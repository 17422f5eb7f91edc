//! Mutual exclusion backed by the platform's native lock.
//!
//! # Pattern Overview
//!
//! ```text
//! Mutex (owns the native lock, heap-pinned)
//!       │
//!       │ mutex.lock()
//!       ▼
//! LockGuard<'_> (RAII guard, releases on every exit path)
//! ```
//!
//! The mutex carries no data. It guards whatever its users agree it guards;
//! the crate enforces only the exclusion itself and the release discipline:
//! the guard returned by [`Mutex::lock`] unlocks exactly once, when it
//! drops, including during panic unwinding.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::mem;

use osthread_sys as sys;

/// A native mutual-exclusion lock.
///
/// Non-recursive: locking from the thread that already holds it is
/// undefined. Not clonable; duplicates would not share exclusion state.
///
/// The native primitive is registered with the OS by address, so it lives
/// in a heap box that never moves while the movable wrapper travels freely.
pub struct Mutex {
    native: Box<UnsafeCell<sys::RawMutex>>,
}

// SAFETY: the native lock is built to be locked and unlocked from any
// thread; all access goes through the raw pointer handed to the OS.
unsafe impl Send for Mutex {}
unsafe impl Sync for Mutex {}

impl Mutex {
    /// Creates a new unlocked mutex.
    pub fn new() -> Mutex {
        // SAFETY: all-zero storage is valid input for mutex_init, which
        // overwrites it with an initialized native lock.
        let native: Box<UnsafeCell<sys::RawMutex>> =
            Box::new(UnsafeCell::new(unsafe { mem::zeroed() }));
        // SAFETY: freshly allocated, uninitialized storage.
        unsafe { sys::mutex_init(native.get()) };
        Mutex { native }
    }

    /// Blocks until the calling thread holds the lock, then returns the
    /// guard that will release it.
    ///
    /// There is no fairness guarantee beyond exclusivity: contending
    /// threads acquire in whatever order the OS scheduler produces.
    pub fn lock(&self) -> LockGuard<'_> {
        // SAFETY: the lock is initialized and outlives the guard.
        unsafe { sys::mutex_lock(self.native.get()) };
        LockGuard {
            mutex: self,
            _not_send: PhantomData,
        }
    }

    /// Releases the lock. Only reachable from [`LockGuard::drop`], so the
    /// calling thread is the holder.
    fn unlock(&self) {
        // SAFETY: see above; holding a guard is holding the lock.
        unsafe { sys::mutex_unlock(self.native.get()) };
    }

    /// Raw pointer to the native lock, valid for the life of this `Mutex`.
    ///
    /// Locking or unlocking through it while this crate's guards manage the
    /// lock is a contract violation.
    #[inline]
    pub fn native_handle(&self) -> *mut sys::RawMutex {
        self.native.get()
    }
}

impl Default for Mutex {
    fn default() -> Mutex {
        Mutex::new()
    }
}

impl Drop for Mutex {
    fn drop(&mut self) {
        // Contract: no thread holds or waits on the lock at this point.
        unsafe { sys::mutex_destroy(self.native.get()) };
    }
}

/// Scoped lock: acquired by [`Mutex::lock`], released exactly once when the
/// guard drops, on every exit path including panics.
///
/// The guard borrows its mutex, so it cannot outlive it:
///
/// ```compile_fail
/// use osthread::{LockGuard, Mutex};
///
/// let guard: LockGuard<'_> = {
///     let mutex = Mutex::new();
///     mutex.lock()
///     // mutex dropped here while still borrowed
/// };
/// ```
///
/// And it cannot migrate to another thread, because native lock ownership
/// is thread-specific:
///
/// ```compile_fail
/// use osthread::Mutex;
///
/// fn requires_send<T: Send>(_: T) {}
///
/// let mutex = Mutex::new();
/// requires_send(mutex.lock());
/// ```
#[must_use = "if unused, the mutex unlocks immediately"]
pub struct LockGuard<'a> {
    mutex: &'a Mutex,
    /// Raw-pointer marker keeps the guard !Send.
    _not_send: PhantomData<*const ()>,
}

impl LockGuard<'_> {
    /// Native lock this guard holds; proof of ownership for condvar waits.
    #[inline]
    pub(crate) fn mutex_ptr(&self) -> *mut sys::RawMutex {
        self.mutex.native_handle()
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.mutex.unlock();
    }
}
