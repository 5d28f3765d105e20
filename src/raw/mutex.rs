//! `RawMutex`: a three-state word lock that parks contended waiters.

use core::fmt;

use crossbeam_utils::Backoff;

use super::futex;
use crate::cfg::atomic::{AtomicU32, Ordering};
use crate::cfg::hint;
use crate::trace::event;

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;
const CONTENDED: u32 = 2;

/// A mutual-exclusion lock that owns no data.
///
/// This is the lock living inside every [`GuardedCell`](crate::GuardedCell).
/// It is exposed so the set routines in this module can be reused over
/// arbitrary collections of locks, but application code should reach for
/// `GuardedCell` instead.
///
/// # States
/// - 0: unlocked
/// - 1: locked, no thread is parked
/// - 2: locked, threads may be parked (the next unlock wakes one)
pub struct RawMutex {
    state: AtomicU32,
}

impl RawMutex {
    /// Creates a new, unlocked mutex.
    #[cfg(not(all(loom, test)))]
    #[inline]
    pub const fn new() -> Self {
        Self {
            state: AtomicU32::new(UNLOCKED),
        }
    }

    /// Creates a new, unlocked mutex.
    #[cfg(all(loom, test))]
    pub fn new() -> Self {
        Self {
            state: AtomicU32::new(UNLOCKED),
        }
    }

    /// Acquires the mutex, blocking the current thread until it is able to do so.
    #[inline]
    pub fn lock(&self) {
        if self
            .state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            self.lock_slow();
        }
    }

    /// Attempts to acquire the mutex without blocking.
    ///
    /// Returns `true` if the mutex is now held by the caller.
    #[inline]
    pub fn try_lock(&self) -> bool {
        self.state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Releases the mutex.
    ///
    /// # Safety
    ///
    /// The mutex must be held, and the caller must be the one that acquired it
    /// (or have received that acquisition from its owner).
    #[inline]
    pub unsafe fn unlock(&self) {
        if self.state.swap(UNLOCKED, Ordering::Release) == CONTENDED {
            futex::wake_one(&self.state);
        }
    }

    /// Returns `true` if some thread currently holds the mutex.
    ///
    /// The answer may be stale by the time it is returned.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) != UNLOCKED
    }

    #[cold]
    fn lock_slow(&self) {
        if hint::SPIN_BEFORE_PARK {
            let backoff = Backoff::new();
            while !backoff.is_completed() {
                if self.state.load(Ordering::Relaxed) == UNLOCKED
                    && self
                        .state
                        .compare_exchange_weak(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
                        .is_ok()
                {
                    return;
                }
                backoff.snooze();
            }
        }

        event!(trace, mutex = ?(self as *const Self), "lock contended, parking");

        // A thread that has parked can no longer tell whether others are still
        // parked behind it, so from here on the lock is always taken in the
        // contended state and the next unlock wakes a successor.
        while self.state.swap(CONTENDED, Ordering::Acquire) != UNLOCKED {
            futex::wait(&self.state, CONTENDED);
        }
    }
}

impl Default for RawMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RawMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawMutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}
