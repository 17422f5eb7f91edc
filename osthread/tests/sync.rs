//! Mutex/condvar coordination: predicate waits, broadcast, and a bounded
//! work queue driven by a not-full/not-empty condition pair.

use std::cell::UnsafeCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use osthread::{sleep, spawn, Condvar, Mutex};

/// One-way latch: raised once, observed under its lock.
struct Flag {
    lock: Mutex,
    changed: Condvar,
    set: UnsafeCell<bool>,
}

// SAFETY: `set` is only accessed while `lock` is held.
unsafe impl Sync for Flag {}

impl Flag {
    fn new() -> Flag {
        Flag {
            lock: Mutex::new(),
            changed: Condvar::new(),
            set: UnsafeCell::new(false),
        }
    }

    fn raise(&self) {
        let _guard = self.lock.lock();
        // SAFETY: guarded write.
        unsafe { *self.set.get() = true };
        self.changed.broadcast();
    }

    fn wait_until_raised(&self) {
        let mut guard = self.lock.lock();
        // Spurious wakes are allowed, so the predicate governs the loop.
        // SAFETY: guarded read; the borrow ends before each wait.
        while unsafe { !*self.set.get() } {
            self.changed.wait(&mut guard);
        }
    }
}

#[test]
fn wait_returns_with_predicate_true_and_lock_held() {
    let flag = Arc::new(Flag::new());
    let raiser = {
        let flag = Arc::clone(&flag);
        spawn(move || {
            sleep(Duration::from_millis(20));
            flag.raise();
        })
        .expect("spawn failed")
    };

    flag.wait_until_raised();
    // The waiter re-holds the lock when wait returns, so this read inside
    // the helper was race-free; check once more from this thread.
    let _guard = flag.lock.lock();
    // SAFETY: guarded read.
    assert!(unsafe { *flag.set.get() });

    let mut raiser = raiser;
    raiser.join();
}

#[test]
fn signal_wakes_a_waiter() {
    let flag = Arc::new(Flag::new());
    let waiter = {
        let flag = Arc::clone(&flag);
        spawn(move || flag.wait_until_raised()).expect("spawn failed")
    };

    sleep(Duration::from_millis(20));
    {
        let _guard = flag.lock.lock();
        // SAFETY: guarded write.
        unsafe { *flag.set.get() = true };
        flag.changed.signal();
    }

    // join only returns once the waiter has been woken and finished.
    let mut waiter = waiter;
    waiter.join();
}

#[test]
fn broadcast_unblocks_every_waiter() {
    const WAITERS: usize = 4;

    let flag = Arc::new(Flag::new());
    let woken = Arc::new(AtomicUsize::new(0));

    let mut waiters = Vec::new();
    for _ in 0..WAITERS {
        let flag = Arc::clone(&flag);
        let woken = Arc::clone(&woken);
        waiters.push(
            spawn(move || {
                flag.wait_until_raised();
                woken.fetch_add(1, Ordering::SeqCst);
            })
            .expect("spawn failed"),
        );
    }

    // Give the waiters a chance to actually block first.
    sleep(Duration::from_millis(30));
    flag.raise();

    for waiter in &mut waiters {
        waiter.join();
    }
    assert_eq!(woken.load(Ordering::SeqCst), WAITERS);
}

const QUEUE_CAPACITY: usize = 2;

struct QueueState {
    jobs: VecDeque<u32>,
    done: bool,
}

/// Bounded job queue: producers block while full, the consumer blocks while
/// empty, and `pop` returns `None` once `done` is set and the queue drains.
struct JobQueue {
    lock: Mutex,
    not_empty: Condvar,
    not_full: Condvar,
    state: UnsafeCell<QueueState>,
}

// SAFETY: `state` is only accessed while `lock` is held.
unsafe impl Sync for JobQueue {}

impl JobQueue {
    fn new() -> JobQueue {
        JobQueue {
            lock: Mutex::new(),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            state: UnsafeCell::new(QueueState {
                jobs: VecDeque::new(),
                done: false,
            }),
        }
    }

    fn push(&self, job: u32) {
        let mut guard = self.lock.lock();
        loop {
            // SAFETY: guarded access; the borrow ends before any wait.
            let full = unsafe { (*self.state.get()).jobs.len() == QUEUE_CAPACITY };
            if !full {
                break;
            }
            self.not_full.wait(&mut guard);
        }
        // SAFETY: guarded access.
        unsafe { (*self.state.get()).jobs.push_back(job) };
        self.not_empty.signal();
    }

    fn finish(&self) {
        let _guard = self.lock.lock();
        // SAFETY: guarded access.
        unsafe { (*self.state.get()).done = true };
        self.not_empty.broadcast();
    }

    fn pop(&self) -> Option<u32> {
        let mut guard = self.lock.lock();
        loop {
            // SAFETY: guarded access; the borrow ends before any wait.
            let (job, finished) = unsafe {
                let state = &mut *self.state.get();
                (state.jobs.pop_front(), state.done)
            };
            if let Some(job) = job {
                self.not_full.signal();
                return Some(job);
            }
            if finished {
                return None;
            }
            self.not_empty.wait(&mut guard);
        }
    }
}

#[test]
fn bounded_queue_drains_in_order() {
    struct Seen {
        lock: Mutex,
        jobs: UnsafeCell<Vec<u32>>,
    }
    // SAFETY: `jobs` is only accessed while `lock` is held.
    unsafe impl Sync for Seen {}

    let queue = Arc::new(JobQueue::new());
    let seen = Arc::new(Seen {
        lock: Mutex::new(),
        jobs: UnsafeCell::new(Vec::new()),
    });

    let mut consumer = {
        let queue = Arc::clone(&queue);
        let seen = Arc::clone(&seen);
        spawn(move || {
            while let Some(job) = queue.pop() {
                let _guard = seen.lock.lock();
                // SAFETY: guarded write.
                unsafe { (*seen.jobs.get()).push(job) };
            }
        })
        .expect("spawn failed")
    };

    // Capacity 2 forces the producer through the not-full wait as well.
    for job in 1..=5 {
        queue.push(job);
    }
    queue.finish();
    consumer.join();

    let _guard = seen.lock.lock();
    // SAFETY: guarded read.
    assert_eq!(unsafe { &*seen.jobs.get() }, &vec![1, 2, 3, 4, 5]);
}
