//! Ownership-safe wrappers over the operating system's native threading
//! primitives: thread spawn/join/detach, mutexes, condition variables, and
//! scoped lock guards, with one API across the POSIX and Win32 backends of
//! [`osthread_sys`].
//!
//! # Pattern Overview
//!
//! ```text
//! spawn(closure)
//!       │ boxes the closure into a heap Envelope (type-erased)
//!       ▼
//! osthread_sys::thread_create(run_envelope, envelope_ptr)
//!       │ success                          │ failure
//!       ▼                                  ▼
//! ThreadHandle (joinable)            spawn frees the Envelope,
//!   new thread runs the closure,     returns SpawnError
//!   then frees the Envelope
//! ```
//!
//! The Envelope has exactly one owner at every instant: the spawning caller
//! until the OS accepts the thread, the new thread afterwards. Whichever
//! side owns it frees it, so captured state is released exactly once on
//! every path, panics included.
//!
//! # Ownership rules
//!
//! - [`ThreadHandle`] is move-only and must be consumed by [`ThreadHandle::join`]
//!   or [`ThreadHandle::detach`]; dropping a handle that still owns a live
//!   thread aborts the process.
//! - [`Mutex`] carries no data. It guards whatever its users agree it
//!   guards; [`LockGuard`] is the only way the lock is released.
//! - [`Condvar::wait`] takes the guard as proof the caller holds the mutex
//!   and may wake spuriously, so waiters re-check their predicate in a loop.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//!
//! let hits = Arc::new(AtomicU32::new(0));
//! let mut workers = Vec::new();
//! for _ in 0..4 {
//!     let hits = Arc::clone(&hits);
//!     workers.push(
//!         osthread::spawn(move || {
//!             hits.fetch_add(1, Ordering::Relaxed);
//!         })
//!         .expect("thread creation failed"),
//!     );
//! }
//! for worker in &mut workers {
//!     worker.join();
//! }
//! assert_eq!(hits.load(Ordering::Relaxed), 4);
//! ```

pub mod condvar;
pub mod error;
pub mod mutex;
pub mod thread;

pub use condvar::Condvar;
pub use error::SpawnError;
pub use mutex::{LockGuard, Mutex};
pub use thread::{sleep, spawn, ThreadHandle};
