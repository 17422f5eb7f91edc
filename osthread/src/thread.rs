//! Thread creation, the owning handle, and the closure envelope.
//!
//! # Pattern Overview
//!
//! ```text
//! Envelope (heap, owns the type-erased closure)
//!       │
//!       │ spawn() leaks it across the fixed `void* -> void` boundary
//!       ▼
//! run_envelope (thread entry: reconstitute, invoke once, free)
//! ```
//!
//! The envelope's single owner moves from the spawning caller to the new
//! thread at the instant the OS accepts the thread. Whichever side owns it
//! frees it, so the closure and its captures are released exactly once
//! whether the thread runs to completion, panics, or never starts.

use std::ffi::c_void;
use std::fmt;
use std::mem::MaybeUninit;
use std::panic::{self, AssertUnwindSafe};
use std::process;
use std::time::Duration;

use crate::error::SpawnError;
use osthread_sys as sys;

/// Heap-allocated package carrying a spawned closure across the C
/// thread-entry boundary.
struct Envelope {
    callable: Box<dyn FnOnce() + Send + 'static>,
}

impl Envelope {
    fn new<F>(f: F) -> Envelope
    where
        F: FnOnce() + Send + 'static,
    {
        Envelope {
            callable: Box::new(f),
        }
    }

    /// Runs the wrapped closure. Consumes the envelope: the closure is
    /// invoked at most once and its captures are dropped afterwards,
    /// panic or not.
    fn invoke(self) {
        // AssertUnwindSafe: the closure is consumed here and nothing
        // observes its state after a panic.
        if panic::catch_unwind(AssertUnwindSafe(self.callable)).is_err() {
            tracing::error!("spawned thread panicked; its captured state has been dropped");
        }
    }
}

/// Fixed-signature entry handed to the platform layer. Receives the
/// envelope's address, runs it, and frees it: the single deallocation
/// point once a thread has started.
unsafe extern "C" fn run_envelope(envelope: *mut c_void) {
    let envelope = Box::from_raw(envelope.cast::<Envelope>());
    envelope.invoke();
}

/// Starts a new OS thread running `f`.
///
/// Arguments travel as closure captures, by value. Shared state crosses
/// via [`Arc`](std::sync::Arc); borrowing local data does not compile:
///
/// ```compile_fail
/// let data = vec![1, 2, 3];
/// let view = &data;
/// osthread::spawn(move || println!("{}", view.len())).unwrap();
/// ```
///
/// and neither does capturing something that cannot change threads:
///
/// ```compile_fail
/// use std::rc::Rc;
///
/// let counter = Rc::new(0u32);
/// osthread::spawn(move || drop(counter)).unwrap();
/// ```
///
/// On success the returned handle owns the thread and must be consumed by
/// [`ThreadHandle::join`] or [`ThreadHandle::detach`]. On failure the
/// closure has already been dropped and the error carries the OS code.
///
/// Returns as soon as the OS scheduler accepts the thread; `f` may not
/// have started running yet.
pub fn spawn<F>(f: F) -> Result<ThreadHandle, SpawnError>
where
    F: FnOnce() + Send + 'static,
{
    let envelope = Box::into_raw(Box::new(Envelope::new(f)));
    let mut native = MaybeUninit::<sys::RawThread>::uninit();
    // SAFETY: run_envelope matches the fixed entry signature, and the
    // leaked envelope stays valid until exactly one of its two possible
    // owners frees it.
    let rc = unsafe { sys::thread_create(native.as_mut_ptr(), run_envelope, envelope.cast()) };
    if rc != 0 {
        // Ownership never left this call; free the envelope here, uninvoked.
        // SAFETY: the thread was not started, so this is the sole owner.
        drop(unsafe { Box::from_raw(envelope) });
        tracing::warn!(os_error = rc, "thread creation failed");
        return Err(SpawnError::ResourceExhausted(rc));
    }
    Ok(ThreadHandle {
        // SAFETY: thread_create wrote the identifier on success.
        native: unsafe { native.assume_init() },
        joinable: true,
    })
}

/// Owning handle to one native thread.
///
/// A handle is joinable from the moment [`spawn`] succeeds until
/// [`join`](ThreadHandle::join) or [`detach`](ThreadHandle::detach)
/// consumes that obligation; both are no-ops afterwards. Dropping a handle
/// that is still joinable would silently abandon a live thread, so it
/// aborts the process instead.
///
/// Moving the handle transfers the obligation with it; Rust's move
/// semantics guarantee the drop check only ever runs on the current owner.
pub struct ThreadHandle {
    native: sys::RawThread,
    joinable: bool,
}

// SAFETY: the native identifier is an owned capability. Mutating
// operations take &mut self, and the underlying join/detach calls are
// valid from any thread.
unsafe impl Send for ThreadHandle {}
unsafe impl Sync for ThreadHandle {}

impl ThreadHandle {
    /// Blocks until the thread terminates.
    ///
    /// Establishes a happens-before edge: every side effect of the spawned
    /// closure is visible once this returns. No-op if the handle is no
    /// longer joinable.
    pub fn join(&mut self) {
        if self.joinable {
            // SAFETY: joinable means the thread is live and not yet
            // joined or detached.
            unsafe { sys::thread_join(self.native) };
            self.joinable = false;
        }
    }

    /// Releases the thread to run independently; the OS reclaims its
    /// resources when it terminates. No-op if the handle is no longer
    /// joinable.
    pub fn detach(&mut self) {
        if self.joinable {
            // SAFETY: as in join.
            unsafe { sys::thread_detach(self.native) };
            self.joinable = false;
        }
    }

    /// Whether the handle still owns a live, unjoined, undetached thread.
    #[inline]
    pub fn is_joinable(&self) -> bool {
        self.joinable
    }

    /// The raw native identifier, for interop with platform APIs.
    ///
    /// Ownership stays with the handle; joining or detaching through the
    /// raw identifier is a contract violation.
    #[inline]
    pub fn native_handle(&self) -> sys::RawThread {
        self.native
    }
}

impl fmt::Debug for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadHandle")
            .field("joinable", &self.joinable)
            .finish_non_exhaustive()
    }
}

impl Drop for ThreadHandle {
    fn drop(&mut self) {
        if self.joinable {
            tracing::error!("thread handle dropped while joinable; aborting");
            process::abort();
        }
    }
}

/// Suspends the calling thread for at least `duration`.
///
/// The duration is rounded up to whole milliseconds; the thread may wake
/// later than requested but never earlier. Sleeping is not a
/// synchronization tool.
pub fn sleep(duration: Duration) {
    let mut ms = duration.as_millis();
    if duration.subsec_nanos() % 1_000_000 != 0 {
        ms += 1;
    }
    sys::thread_sleep(ms.min(u128::from(u64::MAX)) as u64);
}
